//! Turns a natural-language request into sanitized Strudel code.
//!
//! Every call sends the fixed domain preamble as the system instruction, the
//! retained history, and one new request. The request either asks for a fresh
//! program or embeds the current program verbatim and asks for a complete
//! modified version. History only grows when a call produced usable code.

use std::sync::Arc;

use crate::core_types::{Message, TurnKind};
use crate::errors::SessionError;
use crate::llm::LLM;
use crate::sanitizer::sanitize;
use crate::session::Session;

pub const SYSTEM_PROMPT: &str = r#"You are an expert electronic music producer and Strudel live coder.
Strudel is a pattern-based live coding environment for making music in the browser.

Key Strudel concepts:
- Use functions like sound(), note(), s() for samples/synths
- Chain methods with .method() syntax
- Pattern mini-notation: "bd sd hh sd" plays bass drum, snare, hi-hat, snare
- Use .fast(n), .slow(n) for tempo changes
- Use .gain(n) for volume (0-1)
- Use .room(n), .delay(n), .lpf(freq) for effects
- Use stack() to layer patterns
- Common samples: bd (kick), sd (snare), hh (hi-hat), cp (clap)
- Synths: sawtooth, square, triangle
- Use note("c3 e3 g3") for melodies
- Use .struct() to apply rhythmic structure

IMPORTANT: Only output valid Strudel code, nothing else. No explanations, no markdown, just the code.
If updating existing code, provide the complete updated version.

Example patterns:
- Techno: s("bd sd bd sd").fast(2).gain(0.8)
- House: s("bd ~ ~ ~ bd ~ ~ ~, ~ cp ~ cp").room(0.5)
- Ambient: note("c3 e3 g3 a3").slow(2).s("sawtooth").lpf(800)
"#;

/// Request payload for one turn.
pub fn build_user_prompt(request: &str, current_program: Option<&str>) -> String {
    match current_program {
        Some(code) => format!(
            "Current Strudel code:\n{}\n\nUser wants to update: {}\n\nGenerate the complete updated Strudel code.",
            code, request
        ),
        None => format!(
            "Generate Strudel code for: {}\n\nInclude appropriate sounds, rhythms, and effects based on the description.",
            request
        ),
    }
}

pub struct GenerationClient {
    llm: Arc<dyn LLM>,
}

impl GenerationClient {
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self { llm }
    }

    /// Asks the model for code and returns it sanitized.
    ///
    /// Calls the model exactly once. On any failure `session` is left as it
    /// was; on success the request and the cleaned code are appended to its
    /// history. Setting the current program is the caller's job.
    pub async fn generate(
        &self,
        session: &mut Session,
        request: &str,
        kind: TurnKind,
    ) -> Result<String, SessionError> {
        let current = match kind {
            TurnKind::Update => session.current_program(),
            TurnKind::Initial => None,
        };
        let user_prompt = build_user_prompt(request, current);

        let mut messages = Vec::with_capacity(2 + session.memory().stats().message_count);
        messages.push(Message::system(SYSTEM_PROMPT));
        messages.extend(session.memory().get_context());
        messages.push(Message::user(user_prompt.clone()));

        log::debug!(
            "Requesting {:?} generation with {} context messages",
            kind,
            messages.len()
        );

        let response = self.llm.generate(messages).await.map_err(|e| {
            log::error!("Error generating code: {}", e);
            e
        })?;

        if let Some(usage) = &response.usage {
            log::debug!(
                "Model usage: {} prompt / {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let raw = response.content.unwrap_or_default();
        let code = sanitize(&raw);
        if code.is_empty() {
            log::warn!(
                "Model returned nothing usable (finish reason: {:?})",
                response.finish_reason
            );
            return Err(SessionError::EmptyCompletion);
        }

        session
            .memory_mut()
            .add_exchange(Message::user(user_prompt), Message::assistant(code.clone()));

        Ok(code)
    }
}
