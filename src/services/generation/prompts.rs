//! Prompt templates for product marketing copy and narration.

use std::fmt::Write;

use crate::types::{Locale, ProductBrief};

fn describe(product: &ProductBrief) -> String {
    let mut facts = format!("Product: {}", product.name.trim());

    if let Some(category) = product.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = write!(facts, "\nCategory: {}", category.trim());
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = write!(facts, "\nDescription: {}", description.trim());
    }
    if !product.features.is_empty() {
        facts.push_str("\nFeatures:");
        for feature in &product.features {
            let _ = write!(facts, "\n- {}", feature.trim());
        }
    }
    if let Some(price) = product.price.as_deref().filter(|p| !p.trim().is_empty()) {
        let _ = write!(facts, "\nPrice: {}", price.trim());
    }

    facts
}

/// Prompt asking for a short marketing description of `product` in `locale`.
///
/// ```
/// use integrations_gemini_media::services::product_text_prompt;
/// use integrations_gemini_media::types::{Locale, ProductBrief};
///
/// let prompt = product_text_prompt(&ProductBrief::new("Trail bike"), Locale::Es);
/// assert!(prompt.contains("Spanish"));
/// assert!(prompt.contains("Trail bike"));
/// ```
pub fn product_text_prompt(product: &ProductBrief, locale: Locale) -> String {
    format!(
        "Write an engaging marketing description of the following product in {language}. \
         Use two short paragraphs, highlight what makes it useful, and do not invent \
         specifications that are not listed.\n\n{facts}",
        language = locale.language_name(),
        facts = describe(product),
    )
}

/// Prompt asking for a spoken advertisement of `product` in `locale`.
pub fn product_audio_prompt(product: &ProductBrief, locale: Locale) -> String {
    format!(
        "Say in {language}, in a warm and upbeat voice, a 20 second advertisement \
         for the following product:\n\n{facts}",
        language = locale.language_name(),
        facts = describe(product),
    )
}
