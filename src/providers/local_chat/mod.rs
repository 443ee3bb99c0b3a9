pub mod client;

pub use client::LocalChatAdapter;
