//! Configuration type definitions for the live-coding agent
//!
//! Everything has a default except the model credential, which has to come
//! from the environment, a config file, or the command line. Mock mode is the
//! one setup that runs without it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::errors::SessionError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const SERVER_URL_ENV: &str = "STRUDEL_SERVER_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_generation_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub auth: LlmAuth,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            base_url: None,
            timeout_ms: default_generation_timeout_ms(),
            parameters: ModelParameters::default(),
            auth: LlmAuth::default(),
        }
    }
}

/// LLM provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    /// Canned sample patterns, no network and no credential.
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelParameters {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmAuth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_server_url")]
    pub server_base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_push_timeout_ms")]
    pub push_timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub health_timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub poll_timeout_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            server_base_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            push_timeout_ms: default_push_timeout_ms(),
            health_timeout_ms: default_probe_timeout_ms(),
            poll_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of request/reply exchanges kept as model context.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_generation_timeout_ms() -> u64 { 60_000 }
fn default_temperature() -> f32 { 0.7 }
fn default_top_p() -> f32 { 0.95 }
fn default_top_k() -> u32 { 40 }
fn default_max_output_tokens() -> u32 { 2048 }
fn default_server_url() -> String { DEFAULT_SERVER_URL.to_string() }
fn default_poll_interval_ms() -> u64 { 500 }
fn default_push_timeout_ms() -> u64 { 5_000 }
fn default_probe_timeout_ms() -> u64 { 2_000 }
fn default_history_limit() -> usize { 10 }

impl AgentConfig {
    /// The resolved model credential, if any.
    pub fn credential(&self) -> Option<&str> {
        self.llm
            .auth
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_mock(&self) -> bool {
        self.llm.provider == LlmProvider::Mock
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if !self.is_mock() && self.credential().is_none() {
            let env_var = self
                .llm
                .auth
                .api_key_env
                .as_deref()
                .unwrap_or(DEFAULT_API_KEY_ENV);
            return Err(SessionError::MissingCredential(env_var.to_string()));
        }

        if self.llm.model.trim().is_empty() {
            return Err(SessionError::Config("LLM model cannot be empty".to_string()));
        }

        let url = self.playback.server_base_url.trim();
        if url.is_empty() {
            return Err(SessionError::Config("Playback server URL cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SessionError::Config(format!(
                "Playback server URL must start with http:// or https://, got '{}'",
                url
            )));
        }

        if self.playback.poll_interval_ms == 0 {
            return Err(SessionError::Config("Poll interval must be greater than 0".to_string()));
        }

        if self.session.history_limit == 0 {
            return Err(SessionError::Config("History limit must be greater than 0".to_string()));
        }

        Ok(())
    }
}
