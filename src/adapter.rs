//! The uniform adapter contract and the message-shaping operations shared
//! across back ends.

use crate::types::{LlmConfig, Message, Role};
use crate::Error;

/// A uniform wrapper over one LLM back end's native API shape.
///
/// The conversation is taken by mutable reference: adapters that honor the
/// query prefix append a synthetic assistant turn to the caller's vec in
/// place (see [`seed_continuation`]), so the mutation is visible at the type
/// level. The answer is `Some` non-empty text or `None` when the back end
/// produced nothing usable; collaborator failures propagate as `Err`.
#[async_trait::async_trait]
pub trait Adapter: Send + Sync {
    /// Static configuration exposed for an outer layer to act on.
    fn llm_config(&self) -> &LlmConfig;

    /// Send the conversation and collapse the response to a single answer.
    async fn call_llm(
        &self,
        messages: &mut Vec<Message>,
        query_prefix: Option<&str>,
    ) -> Result<Option<String>, Error>;
}

/// Append a synthetic assistant turn carrying `prefix`, unless the
/// conversation already ends mid-assistant-turn or no prefix was given.
///
/// Mutates the caller's vec in place. Returns whether a turn was added.
pub(crate) fn seed_continuation(messages: &mut Vec<Message>, prefix: Option<&str>) -> bool {
    let Some(prefix) = prefix.filter(|p| !p.is_empty()) else {
        return false;
    };
    if messages.last().is_some_and(|m| m.role == Role::Assistant) {
        return false;
    }
    messages.push(Message::assistant(prefix));
    true
}

/// Merge a trailing assistant turn into the preceding message, blank-line
/// separated, producing the sequence a strict chat-completion API will
/// accept as input. The caller's conversation is left untouched.
pub(crate) fn fold_trailing_assistant(messages: &[Message]) -> Vec<Message> {
    let mut folded = messages.to_vec();
    if folded.len() >= 2 && folded.last().is_some_and(|m| m.role == Role::Assistant) {
        if let Some(trailing) = folded.pop() {
            if let Some(previous) = folded.last_mut() {
                previous.content.push_str("\n\n");
                previous.content.push_str(&trailing.content);
            }
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_appends_after_user_turn() {
        let mut messages = vec![Message::user("What comes next?")];
        assert!(seed_continuation(&mut messages, Some("The answer is")));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], Message::assistant("The answer is"));
    }

    #[test]
    fn test_seed_skips_trailing_assistant_turn() {
        let mut messages = vec![
            Message::user("What comes next?"),
            Message::assistant("Already seeded"),
        ];
        assert!(!seed_continuation(&mut messages, Some("ignored")));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_seed_ignores_absent_or_empty_prefix() {
        let mut messages = vec![Message::user("hi")];
        assert!(!seed_continuation(&mut messages, None));
        assert!(!seed_continuation(&mut messages, Some("")));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_fold_merges_trailing_assistant() {
        let messages = vec![
            Message::user("Continue this story:"),
            Message::assistant("Once upon a time"),
        ];
        let folded = fold_trailing_assistant(&messages);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].role, Role::User);
        assert_eq!(folded[0].content, "Continue this story:\n\nOnce upon a time");
        // caller's sequence is untouched
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_fold_leaves_non_assistant_tail_alone() {
        let messages = vec![
            Message::system("Be brief."),
            Message::user("Question?"),
        ];
        let folded = fold_trailing_assistant(&messages);
        assert_eq!(folded, messages);
        // folding is pure, so repeating it cannot accumulate anything
        assert_eq!(fold_trailing_assistant(&messages), folded);
    }

    #[test]
    fn test_fold_needs_a_preceding_turn() {
        let messages = vec![Message::assistant("orphan")];
        assert_eq!(fold_trailing_assistant(&messages), messages);
    }
}
