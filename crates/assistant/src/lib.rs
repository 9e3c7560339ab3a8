//! Branch Sentry assistant.
//!
//! A hosted language model answers free-text questions by calling a fixed
//! set of tools over the store. The model is reached through the
//! [`LanguageModel`] trait; [`GeminiClient`] is the production
//! implementation.

pub mod anomaly;
pub mod chat;
pub mod error;
pub mod gemini;
pub mod model;
pub mod prompt;
pub mod tools;

pub use chat::Assistant;
pub use error::AssistantError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{Content, GenerateRequest, LanguageModel, ModelResponse, Part, Role, ToolCall};
pub use tools::{ToolRequest, ToolRunner};
