use std::time::Duration;

use reqwest::Client;

use super::types::{ChatRequest, ChatResponse};
use crate::adapter::{fold_trailing_assistant, Adapter};
use crate::types::{LlmConfig, Message, ParamOverrides, ProviderParams};
use crate::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Adapter for strict chat-completion APIs that reject a trailing
/// assistant-role message as input.
///
/// A conversation ending in an assistant turn is folded before sending: the
/// trailing turn's text is merged into the preceding message, blank-line
/// separated, which preserves the caller's continuation hint without
/// violating the API's structural requirement.
pub struct ChatCompletionAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    params: ProviderParams,
    llm_config: LlmConfig,
}

impl ChatCompletionAdapter {
    /// Create a new chat-completion adapter.
    pub fn new(api_key: String, overrides: ParamOverrides) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, overrides, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new chat-completion adapter with a custom base URL.
    pub fn new_with_base_url(
        api_key: String,
        overrides: ParamOverrides,
        base_url: String,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            params: ProviderParams::new("gpt-3.5-turbo", 0.0).apply(&overrides),
            llm_config: LlmConfig::default(),
        })
    }
}

#[async_trait::async_trait]
impl Adapter for ChatCompletionAdapter {
    fn llm_config(&self) -> &LlmConfig {
        &self.llm_config
    }

    /// The query prefix is accepted for interface symmetry and ignored:
    /// this back end continues as the assistant via the fold, not a prefix.
    async fn call_llm(
        &self,
        messages: &mut Vec<Message>,
        _query_prefix: Option<&str>,
    ) -> Result<Option<String>, Error> {
        if messages.is_empty() {
            return Ok(None);
        }

        let body = ChatRequest {
            model: self.params.model.clone(),
            messages: fold_trailing_assistant(messages),
            temperature: self.params.temperature,
            stop: None,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "chat-completion",
                format!("API error: {error_text}"),
            ));
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.first_content())
    }
}
