use serde::{Deserialize, Serialize};

/// Raw text-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens_to_sample: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Raw text-completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub completion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_completion_deserializes() {
        let response: CompletionResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(response.completion, None);

        let response: CompletionResponse =
            serde_json::from_str(r#"{"completion":"text"}"#).unwrap();
        assert_eq!(response.completion, Some("text".to_string()));
    }
}
