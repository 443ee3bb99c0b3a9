use serde::{Deserialize, Serialize};

use super::message::Message;

/// Generation parameters carried by every request.
///
/// Each adapter owns a provider-specific default; caller-supplied
/// [`ParamOverrides`] are merged into it field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderParams {
    pub model: String,
    pub temperature: Option<f32>,
}

impl ProviderParams {
    /// Create default parameters for a provider.
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        ProviderParams {
            model: model.into(),
            temperature: Some(temperature),
        }
    }

    /// Merge caller overrides into these defaults. Shallow, field by field;
    /// a caller-supplied value wins, an absent one keeps the default.
    pub fn apply(&self, overrides: &ParamOverrides) -> ProviderParams {
        ProviderParams {
            model: overrides.model.clone().unwrap_or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
        }
    }
}

/// Caller-supplied parameter overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Static adapter configuration exposed through [`crate::Adapter::llm_config`].
///
/// The adapter never reads this itself. It is a contract for an outer layer
/// that may inject the current date or few-shot example turns into the
/// message list before calling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enable_todays_date: bool,
    pub few_shot_learning: Vec<Message>,
}
