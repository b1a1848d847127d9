//! @ai:module:intent Catalogue of model identifiers accepted by the extraction service
//! @ai:module:layer domain
//! @ai:module:public_api AvailableModel, ModelProvider
//! @ai:module:stateless true

use crate::error::EvalError;
use serde::{Deserialize, Serialize};

/// @ai:intent Provider family a model is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    GeminiAi,
}

impl ModelProvider {
    /// @ai:intent Convert provider to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::GeminiAi => "geminiai",
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent A model identifier the extraction service knows how to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AvailableModel {
    #[serde(rename = "google/gemini-2.0-flash-001")]
    Gemini20Flash001,
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o-2024-08-06")]
    Gpt4o20240806,
    #[serde(rename = "claude-3-5-sonnet-latest")]
    Claude35SonnetLatest,
    #[serde(rename = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet20241022,
    #[serde(rename = "claude-3-5-sonnet-20240620")]
    Claude35Sonnet20240620,
    #[serde(rename = "o1-mini")]
    O1Mini,
    #[serde(rename = "o1-preview")]
    O1Preview,
}

impl AvailableModel {
    pub const ALL: &'static [AvailableModel] = &[
        AvailableModel::Gemini20Flash001,
        AvailableModel::Gpt4o,
        AvailableModel::Gpt4oMini,
        AvailableModel::Gpt4o20240806,
        AvailableModel::Claude35SonnetLatest,
        AvailableModel::Claude35Sonnet20241022,
        AvailableModel::Claude35Sonnet20240620,
        AvailableModel::O1Mini,
        AvailableModel::O1Preview,
    ];

    /// @ai:intent Identifier string sent to the extraction service
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailableModel::Gemini20Flash001 => "google/gemini-2.0-flash-001",
            AvailableModel::Gpt4o => "gpt-4o",
            AvailableModel::Gpt4oMini => "gpt-4o-mini",
            AvailableModel::Gpt4o20240806 => "gpt-4o-2024-08-06",
            AvailableModel::Claude35SonnetLatest => "claude-3-5-sonnet-latest",
            AvailableModel::Claude35Sonnet20241022 => "claude-3-5-sonnet-20241022",
            AvailableModel::Claude35Sonnet20240620 => "claude-3-5-sonnet-20240620",
            AvailableModel::O1Mini => "o1-mini",
            AvailableModel::O1Preview => "o1-preview",
        }
    }

    /// @ai:intent Provider serving this model
    /// @ai:effects pure
    pub fn provider(&self) -> ModelProvider {
        match self {
            AvailableModel::Gemini20Flash001 => ModelProvider::GeminiAi,
            AvailableModel::Claude35SonnetLatest
            | AvailableModel::Claude35Sonnet20241022
            | AvailableModel::Claude35Sonnet20240620 => ModelProvider::Anthropic,
            AvailableModel::Gpt4o
            | AvailableModel::Gpt4oMini
            | AvailableModel::Gpt4o20240806
            | AvailableModel::O1Mini
            | AvailableModel::O1Preview => ModelProvider::OpenAi,
        }
    }
}

impl std::fmt::Display for AvailableModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AvailableModel {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AvailableModel::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == wanted)
            .ok_or_else(|| EvalError::UnknownModel(wanted.to_string()))
    }
}
