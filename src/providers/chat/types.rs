use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Chat-completion request body. The domain [`Message`] already serializes
/// to the wire shape `{role, content}`, so the history is sent verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Chat-completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// The first choice's message content. `None` when the choice list, the
    /// message, or its content is absent, and never an empty string.
    pub fn first_content(&self) -> Option<String> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .clone()
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_content_present() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_content(), Some("hello".to_string()));
    }

    #[test]
    fn test_first_content_absent_shapes() {
        let empty_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty_choices.first_content(), None);

        let no_choices: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(no_choices.first_content(), None);

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(null_content.first_content(), None);

        let no_message: ChatResponse =
            serde_json::from_str(r#"{"choices":[{}]}"#).unwrap();
        assert_eq!(no_message.first_content(), None);
    }

    #[test]
    fn test_first_content_empty_string_is_none() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":""}}]}"#).unwrap();
        assert_eq!(response.first_content(), None);
    }
}
