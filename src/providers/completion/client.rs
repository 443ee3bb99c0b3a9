use std::time::Duration;

use reqwest::Client;

use super::types::{CompletionRequest, CompletionResponse};
use crate::adapter::Adapter;
use crate::types::{LlmConfig, Message, ParamOverrides, ProviderParams, Role};
use crate::Error;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const MAX_TOKENS_TO_SAMPLE: u32 = 10_000;

/// Adapter for text-completion APIs whose input is one formatted prompt
/// string built from human/assistant tag markers.
///
/// The tags are caller-supplied marker strings (for example `"\n\nHuman:"`
/// and `"\n\nAssistant:"`), not hardcoded.
pub struct RawCompletionAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    human_tag: String,
    assistant_tag: String,
    params: ProviderParams,
    llm_config: LlmConfig,
}

impl RawCompletionAdapter {
    /// Create a new raw-completion adapter with the given tag markers.
    pub fn new(
        api_key: String,
        human_tag: String,
        assistant_tag: String,
        overrides: ParamOverrides,
    ) -> Result<Self, Error> {
        Self::new_with_base_url(
            api_key,
            human_tag,
            assistant_tag,
            overrides,
            DEFAULT_BASE_URL.to_string(),
        )
    }

    /// Create a new raw-completion adapter with a custom base URL.
    pub fn new_with_base_url(
        api_key: String,
        human_tag: String,
        assistant_tag: String,
        overrides: ParamOverrides,
        base_url: String,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            human_tag,
            assistant_tag,
            params: ProviderParams::new("claude-2", 0.0).apply(&overrides),
            llm_config: LlmConfig::default(),
        })
    }
}

/// Concatenate the conversation as one tagged prompt string.
///
/// User turns render as `<human> content`, assistant turns as
/// `<assistant> content`, and system turns ride the human channel wrapped in
/// `<system>` markers. When the conversation does not already end
/// mid-assistant-turn, a bare assistant tag is appended to seed the
/// continuation, with the query prefix space-appended after it if given.
pub(crate) fn render_tagged_prompt(
    messages: &[Message],
    human_tag: &str,
    assistant_tag: &str,
    query_prefix: Option<&str>,
) -> String {
    let mut prompt = String::new();

    for msg in messages {
        match msg.role {
            Role::User => {
                prompt.push_str(human_tag);
                prompt.push(' ');
                prompt.push_str(&msg.content);
            }
            Role::Assistant => {
                prompt.push_str(assistant_tag);
                prompt.push(' ');
                prompt.push_str(&msg.content);
            }
            Role::System => {
                prompt.push_str(human_tag);
                prompt.push_str(" <system>");
                prompt.push_str(&msg.content);
                prompt.push_str("</system>");
            }
        }
    }

    if !messages.last().is_some_and(|m| m.role == Role::Assistant) {
        prompt.push_str(assistant_tag);
        if let Some(prefix) = query_prefix.filter(|p| !p.is_empty()) {
            prompt.push(' ');
            prompt.push_str(prefix);
        }
    }

    prompt
}

#[async_trait::async_trait]
impl Adapter for RawCompletionAdapter {
    fn llm_config(&self) -> &LlmConfig {
        &self.llm_config
    }

    async fn call_llm(
        &self,
        messages: &mut Vec<Message>,
        query_prefix: Option<&str>,
    ) -> Result<Option<String>, Error> {
        let prompt = render_tagged_prompt(
            messages,
            &self.human_tag,
            &self.assistant_tag,
            query_prefix,
        );

        let body = CompletionRequest {
            prompt,
            model: self.params.model.clone(),
            max_tokens_to_sample: MAX_TOKENS_TO_SAMPLE,
            temperature: self.params.temperature,
        };

        let response = self
            .client
            .post(format!("{}/complete", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "raw-completion",
                format!("API error: {error_text}"),
            ));
        }

        let parsed: CompletionResponse = response.json().await?;
        Ok(parsed.completion.filter(|text| !text.is_empty()))
    }
}
