//! Structured logging for the Gemini media client.
//!
//! Provides trait-based logging with structured field support and credential
//! redaction.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

use crate::auth::API_KEY_PARAM;
use crate::config::LogLevel;

const REDACTED: &str = "***REDACTED***";

static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "api_key",
        "apiKey",
        "key",
        "x-goog-api-key",
        "token",
        "access_token",
        "accessToken",
        "secret",
        "password",
        "credential",
        "authorization",
        "auth",
    ]
    .into_iter()
    .collect()
});

/// Logger trait for structured logging.
///
/// Implementations can integrate with various logging backends (e.g., tracing, log, custom).
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning message with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

fn rank(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
        LogLevel::Trace => 4,
    }
}

/// Masks credentials in structured log fields, recursing into objects and arrays.
pub fn redact_sensitive_fields(mut fields: Value) -> Value {
    match &mut fields {
        Value::Object(obj) => {
            for (key, value) in obj.iter_mut() {
                if SENSITIVE_KEYS.contains(key.as_str()) {
                    *value = Value::String(REDACTED.to_string());
                    continue;
                }
                match value {
                    Value::String(s) => {
                        if s.contains("key=") {
                            *s = redact_key_params(&redact_url(s));
                        }
                    }
                    other => *other = redact_sensitive_fields(other.take()),
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                *item = redact_sensitive_fields(item.take());
            }
        }
        _ => {}
    }
    fields
}

/// Replaces the API key query parameter of a URL.
///
/// Strings that do not parse as URLs are returned unchanged.
///
/// ```
/// use integrations_gemini_media::observability::redact_url;
///
/// let url = "https://example.com/v1beta/models/m:generateContent?key=abc";
/// assert!(!redact_url(url).contains("abc"));
/// ```
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    if !url.query_pairs().any(|(k, _)| k == API_KEY_PARAM) {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM { REDACTED.to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Masks the value of every `key=` parameter embedded in free text, such as
/// a URL quoted inside an error message.
///
/// A `key=` preceded by a letter or digit (`monkey=`) is left alone. The
/// value runs until `&`, `#`, whitespace, a quote, a bracket or a separator.
pub fn redact_key_params(text: &str) -> String {
    const MARKER: &str = "key=";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(MARKER) {
        let bounded = !matches!(rest[..pos].chars().next_back(), Some(c) if c.is_ascii_alphanumeric());
        let value_start = pos + MARKER.len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];
        if !bounded {
            continue;
        }

        let value_len = rest
            .find(|c: char| c.is_whitespace() || "&#\"'()[]{}<>,;".contains(c))
            .unwrap_or(rest.len());
        if value_len > 0 && !rest[..value_len].starts_with(REDACTED) {
            out.push_str(REDACTED);
        } else {
            out.push_str(&rest[..value_len]);
        }
        rest = &rest[value_len..];
    }
    out.push_str(rest);
    out
}

/// Structured logger implementation using the tracing crate.
pub struct StructuredLogger {
    name: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Create a new structured logger with the given name.
    ///
    /// # Arguments
    /// * `name` - The logger name (typically service or module name)
    ///
    /// # Example
    /// ```
    /// use integrations_gemini_media::observability::StructuredLogger;
    ///
    /// let logger = StructuredLogger::new("gemini.media");
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level for this logger.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        rank(level) <= rank(self.level)
    }
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if self.should_log(LogLevel::Debug) {
            let fields = redact_sensitive_fields(fields);
            tracing::debug!(logger = %self.name, fields = %fields, "{message}");
        }
    }

    fn info(&self, message: &str, fields: Value) {
        if self.should_log(LogLevel::Info) {
            let fields = redact_sensitive_fields(fields);
            tracing::info!(logger = %self.name, fields = %fields, "{message}");
        }
    }

    fn warn(&self, message: &str, fields: Value) {
        if self.should_log(LogLevel::Warn) {
            let fields = redact_sensitive_fields(fields);
            tracing::warn!(logger = %self.name, fields = %fields, "{message}");
        }
    }

    fn error(&self, message: &str, fields: Value) {
        if self.should_log(LogLevel::Error) {
            let fields = redact_sensitive_fields(fields);
            tracing::error!(logger = %self.name, fields = %fields, "{message}");
        }
    }
}

/// Logger that discards everything.
///
/// Used by the no-op observability stack and in tests.
pub struct DefaultLogger {
    _name: String,
}

impl DefaultLogger {
    /// Creates a new silent logger.
    pub fn new(name: impl Into<String>) -> Self {
        Self { _name: name.into() }
    }
}

impl Logger for DefaultLogger {
    fn debug(&self, _message: &str, _fields: Value) {}

    fn info(&self, _message: &str, _fields: Value) {}

    fn warn(&self, _message: &str, _fields: Value) {}

    fn error(&self, _message: &str, _fields: Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_should_log() {
        let logger = StructuredLogger::new("test").with_level(LogLevel::Info);
        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warn));
        assert!(logger.should_log(LogLevel::Info));
        assert!(!logger.should_log(LogLevel::Debug));
        assert!(!logger.should_log(LogLevel::Trace));
    }

    #[test]
    fn test_redact_sensitive_fields() {
        let redacted = redact_sensitive_fields(json!({
            "api_key": "secret-key-123",
            "model": "gemini-2.0-flash",
            "request": {"authorization": "Bearer token-123", "kind": "image"},
            "attempts": [{"token": "t"}]
        }));

        assert_eq!(redacted["api_key"], REDACTED);
        assert_eq!(redacted["model"], "gemini-2.0-flash");
        assert_eq!(redacted["request"]["authorization"], REDACTED);
        assert_eq!(redacted["request"]["kind"], "image");
        assert_eq!(redacted["attempts"][0]["token"], REDACTED);
    }

    #[test]
    fn test_redact_url_in_fields() {
        let redacted = redact_sensitive_fields(json!({
            "url": "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent?key=sk-123"
        }));

        let url = redacted["url"].as_str().unwrap();
        assert!(!url.contains("sk-123"));
        assert!(url.contains("key=***REDACTED***") || url.contains("key=%2A%2A%2AREDACTED%2A%2A%2A"));
    }

    #[test]
    fn test_redact_key_embedded_in_error_text() {
        let redacted = redact_sensitive_fields(json!({
            "error": "Transport error: error sending request for url (https://generativelanguage.googleapis.com/v1beta/models/m:generateContent?key=sk-SECRET): connection refused",
            "attempt": 1
        }));

        let error = redacted["error"].as_str().unwrap();
        assert!(!error.contains("sk-SECRET"));
        assert!(error.contains("?key=***REDACTED***): connection refused"));
        assert_eq!(redacted["attempt"], 1);
    }

    #[test]
    fn test_redact_key_params() {
        assert_eq!(redact_key_params("a?alt=json&key=abc&b=1"), "a?alt=json&key=***REDACTED***&b=1");
        assert_eq!(redact_key_params("api_key=abc def"), "api_key=***REDACTED*** def");
        assert_eq!(redact_key_params("monkey=business"), "monkey=business");
        assert_eq!(redact_key_params("key="), "key=");
        assert_eq!(redact_key_params("no secrets here"), "no secrets here");
    }

    #[test]
    fn test_redact_url_leaves_other_strings() {
        assert_eq!(redact_url("monkey=business"), "monkey=business");
        assert_eq!(
            redact_url("https://example.com/path?alt=json"),
            "https://example.com/path?alt=json"
        );
    }
}
