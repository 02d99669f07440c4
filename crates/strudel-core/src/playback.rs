//! HTTP link to the playback server
//!
//! The server plays whatever code it last received on `/update`, reports
//! liveness on `/health`, and holds prompts typed into its web page until
//! someone drains them from `/get-prompt`. None of the calls here raise: every
//! fault becomes `false` or `None` and is logged, so a missing or flaky player
//! degrades the session to generation-only instead of ending it.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PlaybackConfig;

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    code: &'a str,
}

/// Body of `/get-prompt`. Anything that does not look like this is treated
/// as an empty queue.
#[derive(Debug, Deserialize)]
struct PromptQueueResponse {
    #[serde(rename = "hasPrompt", default)]
    has_prompt: bool,
    #[serde(default)]
    prompt: Option<String>,
}

/// Client for the playback server's REST API. Cheap to clone.
#[derive(Clone)]
pub struct PlaybackLink {
    client: Client,
    server_url: String,
    push_timeout: Duration,
    health_timeout: Duration,
    poll_timeout: Duration,
}

impl PlaybackLink {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::from_config(&PlaybackConfig {
            server_base_url: server_url.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            client: Client::new(),
            server_url: config.server_base_url.trim_end_matches('/').to_string(),
            push_timeout: Duration::from_millis(config.push_timeout_ms),
            health_timeout: Duration::from_millis(config.health_timeout_ms),
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Send `code` to the player. True iff the server answered 200 in time.
    pub async fn push_code(&self, code: &str) -> bool {
        let update_url = format!("{}/update", self.server_url);

        match self
            .client
            .post(&update_url)
            .timeout(self.push_timeout)
            .json(&UpdateRequest { code })
            .send()
            .await
        {
            Ok(resp) => {
                if resp.status() == StatusCode::OK {
                    log::debug!("Code pushed to playback server ({} bytes)", code.len());
                    true
                } else {
                    log::warn!("Playback server rejected code update: {}", resp.status());
                    false
                }
            }
            Err(e) => {
                log::warn!("Failed to push code to playback server: {}", e);
                false
            }
        }
    }

    pub async fn is_healthy(&self) -> bool {
        let health_url = format!("{}/health", self.server_url);

        match self
            .client
            .get(&health_url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                log::debug!("Playback server health check failed: {}", e);
                false
            }
        }
    }

    /// Drain one operator prompt from the server's queue, if any.
    pub async fn poll_remote_prompt(&self) -> Option<String> {
        let prompt_url = format!("{}/get-prompt", self.server_url);

        let resp = match self
            .client
            .get(&prompt_url)
            .timeout(self.poll_timeout)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                log::debug!("Polling for remote prompts failed: {}", e);
                return None;
            }
        };

        if resp.status() != StatusCode::OK {
            log::debug!("Prompt queue answered {}", resp.status());
            return None;
        }

        match resp.json::<PromptQueueResponse>().await {
            Ok(PromptQueueResponse {
                has_prompt: true,
                prompt: Some(prompt),
            }) if !prompt.trim().is_empty() => Some(prompt.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Ignoring malformed prompt queue response: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for PlaybackLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackLink")
            .field("client", &"<reqwest::Client>")
            .field("server_url", &self.server_url)
            .field("push_timeout", &self.push_timeout)
            .field("health_timeout", &self.health_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}
