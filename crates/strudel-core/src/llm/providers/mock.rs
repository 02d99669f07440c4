//! Offline provider that answers with sample Strudel patterns.
//!
//! Useful for exercising the playback server and the input channels without a
//! model credential. The pattern is picked from keywords in the most recent
//! user message; variants rotate with every call.

use crate::core_types::{LLMResponse, Message, Role};
use crate::errors::SessionError;
use crate::llm::LLM;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

const INITIAL: &[&str] = &[
    "s(\"bd sd bd sd\").gain(0.8)",
    "stack(\n  s(\"bd bd bd bd\").gain(0.8),\n  s(\"~ cp ~ cp\").room(0.3)\n)",
    "s(\"bd ~ bd ~, ~ ~ cp ~, hh*8\").room(0.4)",
];

const WITH_BASS: &[&str] = &[
    "stack(\n  s(\"bd sd bd sd\").gain(0.8),\n  note(\"c2 ~ e2 ~\").s(\"sawtooth\").lpf(400)\n)",
    "stack(\n  s(\"bd bd bd bd\"),\n  s(\"~ cp ~ cp\"),\n  note(\"c2 c2 e2 f2\").s(\"sawtooth\").slow(2).lpf(300)\n)",
];

const FASTER: &[&str] = &[
    "s(\"bd sd bd sd\").fast(2).gain(0.8)",
    "stack(\n  s(\"bd bd bd bd\").fast(1.5),\n  s(\"~ cp ~ cp\").fast(1.5),\n  s(\"hh*16\").gain(0.3)\n)",
];

const ATMOSPHERIC: &[&str] = &[
    "stack(\n  s(\"bd sd bd sd\"),\n  note(\"c3 e3 g3 a3\").s(\"sawtooth\").slow(4).room(0.8).lpf(600)\n)",
    "stack(\n  s(\"bd ~ bd ~\"),\n  note(\"c3 e3 g3\").s(\"triangle\").slow(8).room(0.9).delay(0.5)\n)",
];

const MINIMAL_TECHNO: &[&str] = &[
    "stack(\n  s(\"bd ~ ~ ~ bd ~ ~ ~\").gain(0.9),\n  s(\"~ ~ ~ ~ ~ ~ cp ~\").room(0.3),\n  s(\"hh*8\").gain(0.4)\n).fast(2)",
];

const HOUSE: &[&str] = &[
    "stack(\n  s(\"bd bd bd bd\").gain(0.8),\n  s(\"~ cp ~ cp\").room(0.4),\n  note(\"c3 e3 g3 b3\").s(\"piano\").slow(2),\n  s(\"shaker*8\").gain(0.3)\n)",
];

#[derive(Default)]
pub struct CannedPatternLLM {
    calls: AtomicUsize,
}

impl CannedPatternLLM {
    pub fn new() -> Self {
        Self::default()
    }

    fn patterns_for(prompt: &str) -> &'static [&'static str] {
        let prompt = prompt.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| prompt.contains(w));

        if has(&["bass"]) {
            WITH_BASS
        } else if has(&["faster", "speed"]) {
            FASTER
        } else if has(&["atmospheric", "pad", "ambient"]) {
            ATMOSPHERIC
        } else if has(&["techno"]) {
            MINIMAL_TECHNO
        } else if has(&["house"]) {
            HOUSE
        } else {
            INITIAL
        }
    }

    /// Picks a pattern for `prompt` and advances the rotation.
    pub fn pattern_for(&self, prompt: &str) -> &'static str {
        let patterns = Self::patterns_for(prompt);
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        patterns[call % patterns.len()]
    }
}

/// The user's own words inside a generated request payload.
fn request_text(content: &str) -> &str {
    for marker in ["User wants to update:", "Generate Strudel code for:"] {
        if let Some(idx) = content.find(marker) {
            let rest = &content[idx + marker.len()..];
            return rest.lines().next().unwrap_or(rest).trim();
        }
    }
    content
}

#[async_trait]
impl LLM for CannedPatternLLM {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, SessionError> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| request_text(&m.content))
            .ok_or_else(|| SessionError::Generation("No user message to answer".to_string()))?;

        let pattern = self.pattern_for(prompt);
        log::debug!("Mock provider answering {:?} with a canned pattern", prompt);
        Ok(LLMResponse::text(pattern))
    }
}
