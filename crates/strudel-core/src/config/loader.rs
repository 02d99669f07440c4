//! Configuration loader for YAML files and environment resolution

use crate::config::types::*;
use crate::errors::SessionError;
use std::env;
use std::path::Path;
use tokio::fs;

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults plus whatever the process environment provides.
    pub fn from_env() -> AgentConfig {
        let mut config = AgentConfig::default();
        Self::apply_env(&mut config);
        config
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<AgentConfig, SessionError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            SessionError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse a YAML document and resolve the environment on top of it.
    ///
    /// Validation is left to the caller so command-line overrides can still
    /// be applied afterwards.
    pub fn from_str(content: &str) -> Result<AgentConfig, SessionError> {
        let mut config: AgentConfig = if content.trim().is_empty() {
            AgentConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Self::apply_env(&mut config);
        Ok(config)
    }

    pub fn apply_env(config: &mut AgentConfig) {
        Self::apply_env_with(config, |key| env::var(key).ok());
    }

    /// Resolve credential and server URL through `lookup`.
    ///
    /// An explicit `api_key` wins over the environment; the server URL
    /// variable wins over the file.
    pub fn apply_env_with<F>(config: &mut AgentConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if config.credential().is_none() {
            let env_var = config
                .llm
                .auth
                .api_key_env
                .clone()
                .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
            match lookup(&env_var).filter(|value| !value.trim().is_empty()) {
                Some(key) => config.llm.auth.api_key = Some(key),
                None => log::debug!("No model credential found in {}", env_var),
            }
        }

        if let Some(url) = lookup(SERVER_URL_ENV).filter(|value| !value.trim().is_empty()) {
            log::debug!("Playback server URL taken from {}: {}", SERVER_URL_ENV, url);
            config.playback.server_base_url = url;
        }
    }
}
