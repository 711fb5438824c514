//! The closed error taxonomy shared by every failure path.

use std::fmt;

use crate::types::Locale;

/// Classification of a failed generation.
///
/// The set is closed: callers can match exhaustively and display
/// [`ErrorKind::message`] without inspecting the underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected locally or by the service (HTTP 400).
    InvalidInput,
    /// The API key is missing or invalid (HTTP 401).
    Unauthorized,
    /// The API key is not allowed to use the model (HTTP 403).
    Forbidden,
    /// The service asked the client to slow down (HTTP 429).
    RateLimited,
    /// The service failed internally (HTTP 500).
    ServerError,
    /// No HTTP status was received (connection, DNS, TLS, timeout).
    Transport,
    /// A 2xx response did not have the expected shape.
    MalformedResponse,
    /// Anything not covered above.
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::InvalidInput,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::RateLimited,
        ErrorKind::ServerError,
        ErrorKind::Transport,
        ErrorKind::MalformedResponse,
        ErrorKind::Unknown,
    ];

    /// Stable identifier used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Transport => "transport",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether the failure may go away on its own.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimited)
    }

    /// User-facing message in English.
    pub fn message(self) -> &'static str {
        self.localized_message(Locale::En)
    }

    /// User-facing message for the given locale.
    ///
    /// Locales without a translation fall back to English.
    pub fn localized_message(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Es => match self {
                ErrorKind::InvalidInput => {
                    "La solicitud no es válida. Revisa el texto (mínimo 5 caracteres) e inténtalo de nuevo."
                }
                ErrorKind::Unauthorized => "La clave de API falta o no es válida.",
                ErrorKind::Forbidden => "Se denegó el acceso al servicio de generación para esta clave de API.",
                ErrorKind::RateLimited => "Se alcanzó el límite de solicitudes. Espera un minuto e inténtalo de nuevo.",
                ErrorKind::ServerError => "El servicio de generación tuvo un error interno. Inténtalo más tarde.",
                ErrorKind::Transport => "No se pudo conectar con el servicio de generación. Revisa tu conexión.",
                ErrorKind::MalformedResponse => "El servicio de generación devolvió una respuesta inesperada.",
                ErrorKind::Unknown => "Ocurrió un error inesperado al generar el contenido.",
            },
            _ => match self {
                ErrorKind::InvalidInput => {
                    "The request is invalid. Check the prompt (at least 5 characters) and try again."
                }
                ErrorKind::Unauthorized => "The API key is missing or invalid.",
                ErrorKind::Forbidden => "Access to the generation service was denied for this API key.",
                ErrorKind::RateLimited => "Request limit reached. Please wait a minute and try again.",
                ErrorKind::ServerError => "The generation service had an internal error. Try again later.",
                ErrorKind::Transport => "Could not reach the generation service. Check your connection.",
                ErrorKind::MalformedResponse => "The generation service returned an unexpected response.",
                ErrorKind::Unknown => "An unexpected error occurred while generating content.",
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_only_rate_limited_is_retryable() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.is_retryable(), kind == ErrorKind::RateLimited, "{kind}");
        }
    }

    #[test]
    fn test_messages_are_distinct() {
        let english: HashSet<_> = ErrorKind::ALL.iter().map(|k| k.message()).collect();
        assert_eq!(english.len(), ErrorKind::ALL.len());

        let spanish: HashSet<_> = ErrorKind::ALL
            .iter()
            .map(|k| k.localized_message(Locale::Es))
            .collect();
        assert_eq!(spanish.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_untranslated_locale_falls_back_to_english() {
        assert_eq!(
            ErrorKind::Forbidden.localized_message(Locale::De),
            ErrorKind::Forbidden.message()
        );
    }
}
