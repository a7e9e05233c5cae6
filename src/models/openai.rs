//! OpenAI chat models selectable for research sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// OpenAI chat models.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString)]
pub enum OpenAiModel {
    #[default]
    #[strum(serialize = "gpt-4")]
    Gpt4,
    #[strum(serialize = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,
    #[strum(serialize = "gpt-3.5-turbo")]
    Gpt35Turbo,
    /// Custom/unknown OpenAI model by ID.
    #[strum(default)]
    Custom(String),
}

impl OpenAiModel {
    /// The three models offered in the model picker, best first.
    pub const SELECTABLE: [OpenAiModel; 3] = [Self::Gpt4, Self::Gpt35Turbo16k, Self::Gpt35Turbo];

    /// Get the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Custom(s) => s,
        }
    }

    /// Picker label.
    pub fn label(&self) -> &str {
        match self {
            Self::Gpt4 => "GPT-4",
            Self::Gpt35Turbo16k => "GPT-3.5-16k",
            Self::Gpt35Turbo => "GPT-3.5 (not recommended)",
            Self::Custom(s) => s,
        }
    }

    /// USD price per million (input, output) tokens, when known.
    pub fn pricing_per_million(&self) -> Option<(f64, f64)> {
        match self {
            Self::Gpt4 => Some((30.0, 60.0)),
            Self::Gpt35Turbo16k => Some((3.0, 4.0)),
            Self::Gpt35Turbo => Some((1.5, 2.0)),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Display for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_custom_ids() {
        assert_eq!("gpt-4".parse::<OpenAiModel>().unwrap(), OpenAiModel::Gpt4);
        assert_eq!(
            "gpt-3.5-turbo-16k".parse::<OpenAiModel>().unwrap(),
            OpenAiModel::Gpt35Turbo16k
        );
        assert_eq!(
            "gpt-4o-mini".parse::<OpenAiModel>().unwrap(),
            OpenAiModel::Custom("gpt-4o-mini".into())
        );
    }

    #[test]
    fn display_matches_api_id() {
        assert_eq!(OpenAiModel::Gpt35Turbo.to_string(), "gpt-3.5-turbo");
        assert!(OpenAiModel::Custom("x".into()).pricing_per_million().is_none());
    }
}
