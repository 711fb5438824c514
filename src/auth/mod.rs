//! API key placement for outbound requests.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use url::Url;

use crate::config::{AuthMethod, MediaConfig};

/// Header carrying the key when [`AuthMethod::Header`] is selected.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Query parameter carrying the key when [`AuthMethod::QueryParam`] is selected.
pub const API_KEY_PARAM: &str = "key";

/// Attaches credentials to an outbound request.
pub trait AuthManager: Send + Sync {
    /// Adds the credential to either the URL or the header map.
    fn authenticate(&self, url: &mut Url, headers: &mut HashMap<String, String>);

    /// Clone the auth manager into a boxed trait object.
    fn clone_box(&self) -> Box<dyn AuthManager>;
}

/// Static API key authentication.
pub struct ApiKeyAuthManager {
    api_key: SecretString,
    auth_method: AuthMethod,
}

impl ApiKeyAuthManager {
    /// Create a new API key auth manager.
    pub fn new(api_key: SecretString, auth_method: AuthMethod) -> Self {
        Self { api_key, auth_method }
    }

    /// Create from config.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.api_key.clone(), config.auth_method)
    }
}

impl AuthManager for ApiKeyAuthManager {
    fn authenticate(&self, url: &mut Url, headers: &mut HashMap<String, String>) {
        let key = self.api_key.expose_secret();
        match self.auth_method {
            AuthMethod::QueryParam => {
                url.query_pairs_mut().append_pair(API_KEY_PARAM, key);
            }
            AuthMethod::Header => {
                headers.insert(API_KEY_HEADER.to_string(), key.to_string());
            }
        }
    }

    fn clone_box(&self) -> Box<dyn AuthManager> {
        Box::new(Self {
            api_key: self.api_key.clone(),
            auth_method: self.auth_method,
        })
    }
}

impl Clone for Box<dyn AuthManager> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://generativelanguage.googleapis.com/v1beta/models/m:generateContent")
            .unwrap()
    }

    #[test]
    fn test_query_param_auth() {
        let manager = ApiKeyAuthManager::new(SecretString::new("test-key".into()), AuthMethod::QueryParam);
        let mut url = url();
        let mut headers = HashMap::new();

        manager.authenticate(&mut url, &mut headers);

        assert_eq!(url.query(), Some("key=test-key"));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_header_auth() {
        let manager = ApiKeyAuthManager::new(SecretString::new("test-key".into()), AuthMethod::Header);
        let mut url = url();
        let mut headers = HashMap::new();

        manager.authenticate(&mut url, &mut headers);

        assert!(url.query().is_none());
        assert_eq!(headers.get(API_KEY_HEADER).map(String::as_str), Some("test-key"));
    }

    #[test]
    fn test_boxed_clone_keeps_method() {
        let manager: Box<dyn AuthManager> = Box::new(ApiKeyAuthManager::new(
            SecretString::new("k".into()),
            AuthMethod::Header,
        ));
        let cloned = manager.clone();
        let mut url = url();
        let mut headers = HashMap::new();
        cloned.authenticate(&mut url, &mut headers);
        assert!(headers.contains_key(API_KEY_HEADER));
    }
}
