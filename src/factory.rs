use std::env;

use crate::providers::{
    ChatCompletionAdapter, LocalChatAdapter, LocalStreamAdapter, RawCompletionAdapter,
};
use crate::types::ParamOverrides;
use crate::{Adapter, Error};

/// Tag markers used when none are configured explicitly.
const DEFAULT_HUMAN_TAG: &str = "\n\nHuman:";
const DEFAULT_ASSISTANT_TAG: &str = "\n\nAssistant:";

/// Supported back-end families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterKind {
    ChatCompletion,
    RawCompletion,
    LocalChat,
    LocalStream,
}

/// Configuration for creating adapters.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub kind: AdapterKind,
    pub api_key: Option<String>,
    pub human_tag: Option<String>,
    pub assistant_tag: Option<String>,
    pub template_key: Option<String>,
    pub overrides: ParamOverrides,
}

impl AdapterConfig {
    /// Create configuration for the hosted chat-completion back end.
    pub fn chat_completion(api_key: String) -> Self {
        Self {
            kind: AdapterKind::ChatCompletion,
            api_key: Some(api_key),
            human_tag: None,
            assistant_tag: None,
            template_key: None,
            overrides: ParamOverrides::default(),
        }
    }

    /// Create configuration for the hosted raw-completion back end.
    pub fn raw_completion(api_key: String, human_tag: String, assistant_tag: String) -> Self {
        Self {
            kind: AdapterKind::RawCompletion,
            api_key: Some(api_key),
            human_tag: Some(human_tag),
            assistant_tag: Some(assistant_tag),
            template_key: None,
            overrides: ParamOverrides::default(),
        }
    }

    /// Create configuration for the local chat-compatible server.
    pub fn local_chat(template_key: String) -> Self {
        Self {
            kind: AdapterKind::LocalChat,
            api_key: None,
            human_tag: None,
            assistant_tag: None,
            template_key: Some(template_key),
            overrides: ParamOverrides::default(),
        }
    }

    /// Create configuration for the local streaming server.
    pub fn local_stream() -> Self {
        Self {
            kind: AdapterKind::LocalStream,
            api_key: None,
            human_tag: None,
            assistant_tag: None,
            template_key: None,
            overrides: ParamOverrides::default(),
        }
    }

    /// Attach caller parameter overrides.
    pub fn with_overrides(mut self, overrides: ParamOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// `LLM_BRIDGE_PROVIDER` selects the back end explicitly
    /// (chat/completion/local-chat/local-stream); without it the back end is
    /// inferred from which credentials are present.
    pub fn from_env() -> Result<Self, Error> {
        if let Ok(provider) = env::var("LLM_BRIDGE_PROVIDER") {
            return match provider.to_lowercase().as_str() {
                "chat" => {
                    let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
                        Error::config(
                            "OPENAI_API_KEY environment variable is required for the chat back end",
                        )
                    })?;
                    Ok(Self::chat_completion(api_key))
                }
                "completion" => {
                    let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
                        Error::config("ANTHROPIC_API_KEY environment variable is required for the completion back end")
                    })?;
                    Ok(Self::raw_completion(
                        api_key,
                        DEFAULT_HUMAN_TAG.to_string(),
                        DEFAULT_ASSISTANT_TAG.to_string(),
                    ))
                }
                "local-chat" => {
                    let template_key = env::var("LLM_BRIDGE_TEMPLATE")
                        .unwrap_or_else(|_| "mistral".to_string());
                    Ok(Self::local_chat(template_key))
                }
                "local-stream" => Ok(Self::local_stream()),
                other => Err(Error::config(format!(
                    "Invalid LLM_BRIDGE_PROVIDER '{other}'. Valid values are: chat, completion, local-chat, local-stream"
                ))),
            };
        }

        // Fallback to credential-based inference
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            return Ok(Self::chat_completion(api_key));
        }
        if let Ok(api_key) = env::var("ANTHROPIC_API_KEY") {
            return Ok(Self::raw_completion(
                api_key,
                DEFAULT_HUMAN_TAG.to_string(),
                DEFAULT_ASSISTANT_TAG.to_string(),
            ));
        }

        Err(Error::config(
            "No valid API credentials found in environment. Set LLM_BRIDGE_PROVIDER (chat/completion/local-chat/local-stream) with appropriate credentials",
        ))
    }
}

/// Factory for creating adapters.
pub struct AdapterFactory;

impl AdapterFactory {
    /// Create an adapter from configuration.
    pub fn create(config: &AdapterConfig) -> Result<Box<dyn Adapter>, Error> {
        match config.kind {
            AdapterKind::ChatCompletion => {
                let api_key = config.api_key.as_ref().ok_or_else(|| {
                    Error::config("API key required for the chat-completion adapter")
                })?;
                let adapter =
                    ChatCompletionAdapter::new(api_key.clone(), config.overrides.clone())?;
                Ok(Box::new(adapter))
            }
            AdapterKind::RawCompletion => {
                let api_key = config.api_key.as_ref().ok_or_else(|| {
                    Error::config("API key required for the raw-completion adapter")
                })?;
                let human_tag = config
                    .human_tag
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HUMAN_TAG.to_string());
                let assistant_tag = config
                    .assistant_tag
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ASSISTANT_TAG.to_string());
                let adapter = RawCompletionAdapter::new(
                    api_key.clone(),
                    human_tag,
                    assistant_tag,
                    config.overrides.clone(),
                )?;
                Ok(Box::new(adapter))
            }
            AdapterKind::LocalChat => {
                let template_key = config.template_key.as_deref().unwrap_or("mistral");
                let adapter = LocalChatAdapter::new(template_key, config.overrides.clone())?;
                Ok(Box::new(adapter))
            }
            AdapterKind::LocalStream => {
                let adapter = LocalStreamAdapter::new(config.overrides.clone())?;
                Ok(Box::new(adapter))
            }
        }
    }

    /// Create an adapter from environment variables.
    pub fn from_env() -> Result<Box<dyn Adapter>, Error> {
        let config = AdapterConfig::from_env()?;
        Self::create(&config)
    }
}
