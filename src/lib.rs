//! A normalization layer over incompatible LLM back ends.
//!
//! Four adapters — a hosted chat-completion API, a hosted raw-completion API,
//! a locally hosted chat-compatible server, and a locally hosted streaming
//! generation server — expose one uniform contract: a role-tagged
//! conversation in, a single answer (or nothing) out.

pub mod adapter;
pub mod error;
pub mod factory;
pub mod providers;
pub mod sse;
pub mod templates;
pub mod types;

// Re-export core types for easy usage
pub use adapter::Adapter;
pub use error::Error;
pub use factory::{AdapterConfig, AdapterFactory, AdapterKind};
pub use providers::*;
pub use sse::EventStream;
pub use templates::{PromptTemplate, RenderedPrompt};
pub use types::*;
