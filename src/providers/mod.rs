//! Adapter implementations for the supported back-end families.

pub mod chat;
pub mod completion;
pub mod local_chat;
pub mod local_stream;

// Re-export commonly used adapter types
pub use chat::ChatCompletionAdapter;
pub use completion::RawCompletionAdapter;
pub use local_chat::LocalChatAdapter;
pub use local_stream::LocalStreamAdapter;
