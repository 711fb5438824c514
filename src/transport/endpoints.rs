//! Endpoint paths for the Gemini API.

/// Base path for models endpoints.
pub const MODELS: &str = "/models";

/// Constructs the generateContent path for a model.
///
/// # Example
///
/// ```
/// use integrations_gemini_media::transport::endpoints;
///
/// let path = endpoints::generate_content("gemini-2.0-flash");
/// assert_eq!(path, "/models/gemini-2.0-flash:generateContent");
/// ```
pub fn generate_content(model: &str) -> String {
    format!("{}/{}:generateContent", MODELS, model.trim_start_matches("models/"))
}
