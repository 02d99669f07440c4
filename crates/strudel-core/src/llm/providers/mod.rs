//! LLM provider implementations
//!
//! Each provider implements the common `LLM` trait while handling its own
//! protocol and authentication.

use std::sync::Arc;
use crate::config::{LlmConfig, LlmProvider};
use crate::llm::LLM;
use crate::errors::SessionError;

pub mod gemini;
pub mod mock;

/// Create an LLM client based on the provider configuration
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LLM>, SessionError> {
    match config.provider {
        LlmProvider::Gemini => gemini::create_client(config),
        LlmProvider::Mock => Ok(Arc::new(mock::CannedPatternLLM::new())),
    }
}
