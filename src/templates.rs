//! Prompt templates for locally hosted models.
//!
//! Each template is a pure function from a conversation to a single raw
//! prompt plus the stop sequences that bound generation. Templates are keyed
//! by provider/model name. A conversation ending in an assistant turn renders
//! with that turn left open, so the model continues it instead of starting a
//! fresh answer.

use crate::types::{Message, Role};
use crate::Error;

/// A rendered raw prompt plus the stop sequences that bound generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub prompt: String,
    pub stop_sequences: Vec<String>,
}

/// Prompt template, keyed by provider/model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    Mistral,
    Llama2,
    ChatMl,
}

impl PromptTemplate {
    /// Look up a template by its provider/model key.
    pub fn for_key(key: &str) -> Result<Self, Error> {
        match key {
            "mistral" => Ok(PromptTemplate::Mistral),
            "llama2" => Ok(PromptTemplate::Llama2),
            "chatml" => Ok(PromptTemplate::ChatMl),
            other => Err(Error::config(format!("unknown prompt template: {other}"))),
        }
    }

    /// Render a conversation into a raw prompt with stop sequences.
    pub fn render(&self, messages: &[Message]) -> RenderedPrompt {
        match self {
            PromptTemplate::Mistral => render_mistral(messages),
            PromptTemplate::Llama2 => render_llama2(messages),
            PromptTemplate::ChatMl => render_chatml(messages),
        }
    }
}

/// `<s>[INST] instruction [/INST] answer</s>` rounds; system text rides the
/// next instruction block.
fn render_mistral(messages: &[Message]) -> RenderedPrompt {
    let mut prompt = String::from("<s>");
    let mut instruction = String::new();

    for (index, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::System | Role::User => {
                if !instruction.is_empty() {
                    instruction.push('\n');
                }
                instruction.push_str(&msg.content);
            }
            Role::Assistant => {
                prompt.push_str("[INST] ");
                prompt.push_str(&instruction);
                prompt.push_str(" [/INST] ");
                instruction.clear();
                prompt.push_str(&msg.content);
                if index + 1 < messages.len() {
                    prompt.push_str("</s><s>");
                }
            }
        }
    }
    if !instruction.is_empty() {
        prompt.push_str("[INST] ");
        prompt.push_str(&instruction);
        prompt.push_str(" [/INST]");
    }

    RenderedPrompt {
        prompt,
        stop_sequences: vec!["</s>".to_string(), "[INST]".to_string()],
    }
}

/// Llama-2 chat format: the first instruction block carries the system text
/// in a `<<SYS>>` section.
fn render_llama2(messages: &[Message]) -> RenderedPrompt {
    let mut prompt = String::from("<s>");
    let mut instruction = String::new();

    for (index, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::System => {
                instruction.push_str("<<SYS>>\n");
                instruction.push_str(&msg.content);
                instruction.push_str("\n<</SYS>>\n\n");
            }
            Role::User => {
                instruction.push_str(&msg.content);
            }
            Role::Assistant => {
                prompt.push_str("[INST] ");
                prompt.push_str(&instruction);
                prompt.push_str(" [/INST] ");
                instruction.clear();
                prompt.push_str(&msg.content);
                if index + 1 < messages.len() {
                    prompt.push_str(" </s><s>");
                }
            }
        }
    }
    if !instruction.is_empty() {
        prompt.push_str("[INST] ");
        prompt.push_str(&instruction);
        prompt.push_str(" [/INST]");
    }

    RenderedPrompt {
        prompt,
        stop_sequences: vec!["</s>".to_string()],
    }
}

/// ChatML format: one `<|im_start|>role ... <|im_end|>` block per turn. A
/// trailing assistant turn stays unterminated; otherwise an empty assistant
/// block is opened for the model to fill.
fn render_chatml(messages: &[Message]) -> RenderedPrompt {
    let mut prompt = String::new();

    for (index, msg) in messages.iter().enumerate() {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        prompt.push_str("<|im_start|>");
        prompt.push_str(role);
        prompt.push('\n');
        prompt.push_str(&msg.content);

        let trailing_assistant = msg.role == Role::Assistant && index + 1 == messages.len();
        if !trailing_assistant {
            prompt.push_str("<|im_end|>\n");
        }
    }
    if !messages.last().is_some_and(|m| m.role == Role::Assistant) {
        prompt.push_str("<|im_start|>assistant\n");
    }

    RenderedPrompt {
        prompt,
        stop_sequences: vec!["<|im_end|>".to_string()],
    }
}
