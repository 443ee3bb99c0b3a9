//! Tokens produced by the local streaming generation server.

use serde::Deserialize;

/// One token from the generation stream.
///
/// Only the terminal variant carries the final text. Every other tag the
/// server emits deserializes to [`StreamToken::Fragment`] and is consumed
/// and discarded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StreamToken {
    /// Terminal token carrying the full generated text.
    #[serde(rename = "completeMessage")]
    CompleteMessage { message: String },
    /// Intermediate token of any other tag.
    #[serde(other)]
    Fragment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_message_parses() {
        let token: StreamToken =
            serde_json::from_str(r#"{"type":"completeMessage","message":"hello"}"#).unwrap();
        assert_eq!(
            token,
            StreamToken::CompleteMessage {
                message: "hello".to_string()
            }
        );
    }

    #[test]
    fn test_other_tags_are_fragments() {
        let token: StreamToken =
            serde_json::from_str(r#"{"type":"token","text":"he"}"#).unwrap();
        assert_eq!(token, StreamToken::Fragment);

        let token: StreamToken = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(token, StreamToken::Fragment);
    }
}
