pub mod client;
pub mod types;

pub use client::{ChatModel, GroqClient, LlmError};
