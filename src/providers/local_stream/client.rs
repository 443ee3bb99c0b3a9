use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;

use super::types::GenerateRequest;
use crate::adapter::{seed_continuation, Adapter};
use crate::sse::EventStreamExt;
use crate::templates::PromptTemplate;
use crate::types::{LlmConfig, Message, ParamOverrides, ProviderParams, StreamToken};
use crate::Error;

/// Fixed port the local generation server listens on.
const DEFAULT_PORT: u16 = 5005;

/// Adapter for a locally hosted streaming text-generation server.
///
/// The server is invoked with a raw mistral-template prompt and answers with
/// a token stream; consumption runs until the terminal token arrives, whose
/// text is truncated at the first stop sequence. Intermediate tokens are
/// discarded.
pub struct LocalStreamAdapter {
    client: Client,
    base_url: String,
    params: ProviderParams,
    llm_config: LlmConfig,
}

impl LocalStreamAdapter {
    /// Create a new local streaming adapter on the fixed local port.
    pub fn new(overrides: ParamOverrides) -> Result<Self, Error> {
        Self::new_with_base_url(overrides, format!("http://127.0.0.1:{DEFAULT_PORT}"))
    }

    /// Create a new local streaming adapter with a custom base URL.
    pub fn new_with_base_url(overrides: ParamOverrides, base_url: String) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url,
            params: ProviderParams::new("mistral", 0.0).apply(&overrides),
            llm_config: LlmConfig::default(),
        })
    }

    /// Start a generation and return its token stream. Event payloads that
    /// do not parse as tokens are skipped.
    async fn stream_tokens(
        &self,
        prompt: String,
    ) -> Result<impl Stream<Item = Result<StreamToken, Error>>, Error> {
        let body = GenerateRequest {
            prompt,
            model: self.params.model.clone(),
            temperature: self.params.temperature,
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(Error::provider(
                "local-stream",
                format!("API error: {error_text}"),
            ));
        }

        let tokens = response
            .bytes_stream()
            .event_payloads()
            .filter_map(|payload| async move {
                match payload {
                    Ok(data) => serde_json::from_str::<StreamToken>(&data).ok().map(Ok),
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(tokens)
    }
}

/// Consume tokens in order until the terminal one arrives, then truncate its
/// text at the first occurrence of the first stop sequence.
///
/// `None` when the stream ends without a terminal token, or when truncation
/// leaves nothing.
pub(crate) async fn collect_final_text<S>(
    mut tokens: S,
    stop_sequences: &[String],
) -> Result<Option<String>, Error>
where
    S: Stream<Item = Result<StreamToken, Error>> + Unpin,
{
    while let Some(token) = tokens.next().await {
        match token? {
            StreamToken::CompleteMessage { message } => {
                let text = match stop_sequences.first() {
                    Some(stop) => match message.find(stop.as_str()) {
                        Some(at) => &message[..at],
                        None => message.as_str(),
                    },
                    None => message.as_str(),
                };
                return Ok((!text.is_empty()).then(|| text.to_string()));
            }
            StreamToken::Fragment => {}
        }
    }
    Ok(None)
}

#[async_trait::async_trait]
impl Adapter for LocalStreamAdapter {
    fn llm_config(&self) -> &LlmConfig {
        &self.llm_config
    }

    async fn call_llm(
        &self,
        messages: &mut Vec<Message>,
        query_prefix: Option<&str>,
    ) -> Result<Option<String>, Error> {
        seed_continuation(messages, query_prefix);
        let rendered = PromptTemplate::Mistral.render(messages);

        let tokens = self.stream_tokens(rendered.prompt).await?;
        futures_util::pin_mut!(tokens);
        collect_final_text(tokens, &rendered.stop_sequences).await
    }
}
