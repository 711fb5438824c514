//! HTTP request builder for the Gemini API.
//!
//! This module provides the `RequestBuilder` for constructing HTTP requests
//! with proper authentication, headers, and URL formatting.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use super::http::{HttpMethod, HttpRequest};
use crate::auth::AuthManager;
use crate::error::MediaResult;

/// Builder for constructing HTTP requests to the Gemini API.
///
/// The `RequestBuilder` handles:
/// - URL construction with API version prefixes
/// - Authentication via the configured auth manager
/// - Request body serialization
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: Url,
    api_version: String,
    auth_manager: Box<dyn AuthManager>,
}

impl RequestBuilder {
    /// Creates a new request builder.
    pub fn new(base_url: Url, api_version: String, auth_manager: Box<dyn AuthManager>) -> Self {
        Self {
            base_url,
            api_version,
            auth_manager,
        }
    }

    /// Joins the API version and `path` onto the base URL.
    ///
    /// ```no_run
    /// # use integrations_gemini_media::transport::RequestBuilder;
    /// # use integrations_gemini_media::auth::ApiKeyAuthManager;
    /// # use integrations_gemini_media::config::AuthMethod;
    /// # use secrecy::SecretString;
    /// # use url::Url;
    /// let builder = RequestBuilder::new(
    ///     Url::parse("https://generativelanguage.googleapis.com").unwrap(),
    ///     "v1beta".to_string(),
    ///     Box::new(ApiKeyAuthManager::new(SecretString::new("k".into()), AuthMethod::Header)),
    /// );
    /// let url = builder.build_url("/models/gemini-2.0-flash:generateContent").unwrap();
    /// assert!(url.as_str().ends_with("/v1beta/models/gemini-2.0-flash:generateContent"));
    /// ```
    pub fn build_url(&self, path: &str) -> MediaResult<Url> {
        let path = path.trim_start_matches('/');
        let full_path = format!("{}/{}", self.api_version.trim_matches('/'), path);
        Ok(self.base_url.join(&full_path)?)
    }

    /// Builds an authenticated HTTP request, serializing `body` as JSON.
    pub fn build_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&T>,
    ) -> MediaResult<HttpRequest> {
        let mut url = self.build_url(path)?;
        let mut headers = HashMap::new();

        let body = match body {
            Some(body) => {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                Some(Bytes::from(serde_json::to_vec(body)?))
            }
            None => None,
        };

        self.auth_manager.authenticate(&mut url, &mut headers);

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}
