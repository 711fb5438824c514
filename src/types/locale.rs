//! Target languages for generated copy and narration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GenerationError;

/// A supported output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
    /// French.
    Fr,
    /// German.
    De,
    /// Portuguese.
    Pt,
    /// Italian.
    It,
}

impl Locale {
    /// All supported locales.
    pub const ALL: [Locale; 6] = [
        Locale::En,
        Locale::Es,
        Locale::Fr,
        Locale::De,
        Locale::Pt,
        Locale::It,
    ];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
            Locale::De => "de",
            Locale::Pt => "pt",
            Locale::It => "it",
        }
    }

    /// English name of the language, as used in prompt instructions.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Spanish",
            Locale::Fr => "French",
            Locale::De => "German",
            Locale::Pt => "Portuguese",
            Locale::It => "Italian",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = GenerationError;

    /// Accepts bare codes (`es`) and region tags (`es-MX`, `pt_BR`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Locale::ALL
            .into_iter()
            .find(|locale| locale.code() == language)
            .ok_or_else(|| GenerationError::invalid_input(format!("unsupported locale: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_region_tags() {
        assert_eq!("es".parse::<Locale>().unwrap(), Locale::Es);
        assert_eq!("pt_BR".parse::<Locale>().unwrap(), Locale::Pt);
        assert_eq!(" DE-at ".parse::<Locale>().unwrap(), Locale::De);
    }

    #[test]
    fn test_parse_unsupported() {
        assert!("ja".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn test_display_round_trips_code() {
        for locale in Locale::ALL {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }
}
