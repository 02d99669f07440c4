//! Language model provider abstractions.
//!
//! The generation client only ever talks to the `LLM` trait, so the Gemini
//! backend and the canned-pattern mock are interchangeable, and tests can
//! script responses directly.

pub use crate::core_types::{LLMResponse, Message};
use crate::errors::SessionError;
use async_trait::async_trait;

pub mod providers;

pub use providers::create_llm_client;

#[async_trait]
pub trait LLM: Send + Sync {
    /// One completion for the given conversation. Implementations must not
    /// retry internally.
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, SessionError>;
}
