//! Local validation of generation requests.
//!
//! Every check runs before a request is built, so a rejected request never
//! reaches the transport.

use crate::error::{GenerationError, MediaResult};
use crate::types::{GenerationParams, GenerationRequest, ImageRequest, MIN_PROMPT_CHARS};

/// Upper bound of the sampling temperature.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Upper bound of the output size, in tokens.
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Validate a generation request.
///
/// All problems are reported together in one [`GenerationError::InvalidInput`].
pub fn validate_request(request: &GenerationRequest) -> MediaResult<()> {
    let mut details = Vec::new();

    validate_prompt(request.prompt(), &mut details);
    validate_params(request.params(), &mut details);

    match request {
        GenerationRequest::Image(image) => validate_reference(image, &mut details),
        GenerationRequest::Audio(audio) => {
            if audio.voice().is_some_and(|v| v.trim().is_empty()) {
                details.push("voice must not be blank".to_string());
            }
        }
        GenerationRequest::Text(_) => {}
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GenerationError::invalid_input(details.join("; ")))
    }
}

fn validate_prompt(prompt: &str, details: &mut Vec<String>) {
    let chars = prompt.trim().chars().count();
    if chars < MIN_PROMPT_CHARS {
        details.push(format!(
            "prompt must be at least {MIN_PROMPT_CHARS} characters (got {chars})"
        ));
    }
}

/// Validate sampling parameters.
pub fn validate_params(params: &GenerationParams, details: &mut Vec<String>) {
    if !(0.0..=MAX_TEMPERATURE).contains(&params.temperature) {
        details.push(format!(
            "temperature must be between 0.0 and {MAX_TEMPERATURE} (got {})",
            params.temperature
        ));
    }

    if !(0.0..=1.0).contains(&params.top_p) {
        details.push(format!("top_p must be between 0.0 and 1.0 (got {})", params.top_p));
    }

    if !(1..=MAX_OUTPUT_TOKENS).contains(&params.max_output_tokens) {
        details.push(format!(
            "max_output_tokens must be between 1 and {MAX_OUTPUT_TOKENS} (got {})",
            params.max_output_tokens
        ));
    }
}

fn validate_reference(request: &ImageRequest, details: &mut Vec<String>) {
    let Some(reference) = request.reference() else {
        return;
    };

    if reference.data().is_empty() {
        details.push("reference image must not be empty".to_string());
    }

    let is_image = reference
        .mime_type()
        .parse::<mime::Mime>()
        .is_ok_and(|m| m.type_() == mime::IMAGE);
    if !is_image {
        details.push(format!(
            "reference must be an image/* payload (got {:?})",
            reference.mime_type()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{AudioRequest, Locale, ReferenceImage, TextRequest};

    fn image(prompt: &str) -> GenerationRequest {
        ImageRequest::new(prompt).into()
    }

    #[test]
    fn test_prompt_length_boundary() {
        assert!(validate_request(&image("abcd")).is_err());
        assert!(validate_request(&image("   abcd   ")).is_err());
        assert!(validate_request(&image("abcde")).is_ok());
        assert!(validate_request(&image("")).is_err());
    }

    #[test]
    fn test_prompt_length_counts_characters_not_bytes() {
        assert!(validate_request(&image("ñandú")).is_ok());
        assert!(validate_request(&image("ñañá")).is_err());
    }

    #[test]
    fn test_parameter_bounds() {
        let cases = [
            GenerationParams::default().with_temperature(-0.1),
            GenerationParams::default().with_temperature(2.1),
            GenerationParams::default().with_top_p(1.5),
            GenerationParams::default().with_max_output_tokens(0),
            GenerationParams::default().with_max_output_tokens(8193),
            GenerationParams::default().with_temperature(f32::NAN),
        ];

        for params in cases {
            let request: GenerationRequest =
                TextRequest::new("Describe this bicycle", Locale::En).with_params(params).into();
            let error = validate_request(&request).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidInput, "{params:?}");
        }

        let edges = GenerationParams::default()
            .with_temperature(2.0)
            .with_top_p(0.0)
            .with_max_output_tokens(8192);
        let request: GenerationRequest = ImageRequest::new("a red bicycle").with_params(edges).into();
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_reference_must_be_non_empty_image() {
        let empty: GenerationRequest =
            ImageRequest::edit("make it blue", ReferenceImage::new("image/png", Vec::new())).into();
        let text: GenerationRequest =
            ImageRequest::edit("make it blue", ReferenceImage::new("text/plain", vec![1u8])).into();
        let ok: GenerationRequest =
            ImageRequest::edit("make it blue", ReferenceImage::new("image/jpeg", vec![1u8])).into();

        assert!(validate_request(&empty).is_err());
        assert!(validate_request(&text).is_err());
        assert!(validate_request(&ok).is_ok());
    }

    #[test]
    fn test_all_problems_reported_together() {
        let request: GenerationRequest = AudioRequest::new("hi", Locale::Es)
            .with_voice(" ")
            .with_params(GenerationParams::default().with_top_p(2.0))
            .into();

        let message = validate_request(&request).unwrap_err().to_string();
        assert!(message.contains("prompt"));
        assert!(message.contains("top_p"));
        assert!(message.contains("voice"));
    }
}
