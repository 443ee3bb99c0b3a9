use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::adapter::{seed_continuation, Adapter};
use crate::providers::chat::types::{ChatRequest, ChatResponse};
use crate::templates::PromptTemplate;
use crate::types::{LlmConfig, Message, ParamOverrides, ProviderParams};
use crate::Error;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

/// Adapter for a locally hosted server exposing a chat-completion-shaped API
/// but driven by a raw prompt rendered through a model-specific template.
///
/// The rendered prompt travels as a single synthetic user message, with the
/// template's stop sequences passed explicitly.
pub struct LocalChatAdapter {
    client: Client,
    base_url: String,
    template: PromptTemplate,
    params: ProviderParams,
    llm_config: LlmConfig,
}

impl LocalChatAdapter {
    /// Create a new local chat adapter for the given template key.
    pub fn new(template_key: &str, overrides: ParamOverrides) -> Result<Self, Error> {
        Self::new_with_base_url(template_key, overrides, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new local chat adapter with a custom base URL.
    pub fn new_with_base_url(
        template_key: &str,
        overrides: ParamOverrides,
        base_url: String,
    ) -> Result<Self, Error> {
        let template = PromptTemplate::for_key(template_key)?;
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url,
            template,
            params: ProviderParams::new("mistral", 0.0).apply(&overrides),
            llm_config: LlmConfig::default(),
        })
    }
}

#[async_trait::async_trait]
impl Adapter for LocalChatAdapter {
    fn llm_config(&self) -> &LlmConfig {
        &self.llm_config
    }

    async fn call_llm(
        &self,
        messages: &mut Vec<Message>,
        query_prefix: Option<&str>,
    ) -> Result<Option<String>, Error> {
        seed_continuation(messages, query_prefix);
        let rendered = self.template.render(messages);

        let body = ChatRequest {
            model: self.params.model.clone(),
            messages: vec![Message::user(rendered.prompt)],
            temperature: self.params.temperature,
            stop: Some(rendered.stop_sequences),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "local-chat",
                format!("API error: {error_text}"),
            ));
        }

        let parsed: ChatResponse = response.json().await?;
        debug!("local chat raw choice:");
        debug!("{:?}", parsed.choices.first());

        Ok(parsed.first_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_creation() {
        let adapter = LocalChatAdapter::new("mistral", ParamOverrides::default()).unwrap();
        assert_eq!(adapter.params.model, "mistral");
        assert_eq!(adapter.params.temperature, Some(0.0));
        assert_eq!(adapter.template, PromptTemplate::Mistral);
    }

    #[test]
    fn test_unknown_template_key_is_a_config_error() {
        let result = LocalChatAdapter::new("gpt2", ParamOverrides::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
