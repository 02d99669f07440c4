//! Google Gemini API client implementation
//!
//! Talks to the `generateContent` REST endpoint directly. System messages
//! become the request's system instruction, assistant turns are sent with the
//! `model` role.

use crate::config::{LlmConfig, ModelParameters, DEFAULT_API_KEY_ENV, DEFAULT_GEMINI_BASE_URL};
use crate::core_types::{LLMResponse, Message, Role, Usage};
use crate::errors::SessionError;
use crate::llm::LLM;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
    parameters: ModelParameters,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_GEMINI_BASE_URL.to_string())
    }

    /// Create a new Gemini client with custom base URL
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            parameters: ModelParameters::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: Option<i32>,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: Option<i32>,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    code: u16,
    message: String,
}

/// Absent or negative counts read as zero.
fn token_count(count: Option<i32>) -> u32 {
    count.and_then(|c| u32::try_from(c).ok()).unwrap_or(0)
}

fn text_content(role: Option<&str>, text: String) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart { text: Some(text) }],
    }
}

impl GeminiClient {
    fn convert_messages_to_gemini_contents(
        &self,
        messages: Vec<Message>,
    ) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                // Use the last system message as system instruction
                Role::System => system_instruction = Some(text_content(None, message.content)),
                Role::User => contents.push(text_content(Some("user"), message.content)),
                Role::Assistant => contents.push(text_content(Some("model"), message.content)),
            }
        }

        (system_instruction, contents)
    }

    fn convert_gemini_response_to_llm(
        &self,
        response: GeminiResponse,
    ) -> Result<LLMResponse, SessionError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::Generation("No candidates in Gemini response".to_string()))?;

        let text: Vec<String> = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        let content = if text.is_empty() {
            None
        } else {
            Some(text.join(""))
        };

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: token_count(u.prompt_token_count),
            completion_tokens: token_count(u.candidates_token_count),
            total_tokens: token_count(u.total_token_count),
        });

        Ok(LLMResponse {
            content,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LLM for GeminiClient {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, SessionError> {
        let (system_instruction, contents) = self.convert_messages_to_gemini_contents(messages);

        let request = GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: self.parameters.temperature,
                max_output_tokens: self.parameters.max_output_tokens,
                top_p: self.parameters.top_p,
                top_k: self.parameters.top_k,
            },
            system_instruction,
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        log::debug!("Sending {} content entries to {}", request.contents.len(), url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::Generation(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(gemini_error) = serde_json::from_str::<GeminiError>(&error_text) {
                return Err(SessionError::Generation(format!(
                    "Gemini API error {}: {}",
                    gemini_error.error.code, gemini_error.error.message
                )));
            }

            return Err(SessionError::Generation(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Parsing(format!("Failed to parse Gemini response: {}", e)))?;

        self.convert_gemini_response_to_llm(gemini_response)
    }
}

/// Create a Gemini LLM client from configuration
///
/// The credential must already be resolved into `auth.api_key`.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LLM>, SessionError> {
    let api_key = config
        .auth
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            SessionError::MissingCredential(
                config
                    .auth
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            )
        })?;

    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    let client = GeminiClient::with_base_url(api_key, config.model.clone(), base_url)
        .with_parameters(config.parameters.clone())
        .with_timeout(Duration::from_millis(config.timeout_ms));

    Ok(Arc::new(client))
}
