//! Core type definitions shared by the session, the model providers and the
//! input channels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SessionError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// Usage statistics structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMResponse {
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl LLMResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: None,
            usage: None,
        }
    }
}

/// Which channel a turn arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnSource {
    Interactive,
    Remote,
}

impl fmt::Display for TurnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnSource::Interactive => write!(f, "interactive"),
            TurnSource::Remote => write!(f, "web"),
        }
    }
}

/// One unit of natural-language input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub source: TurnSource,
    pub text: String,
}

impl Turn {
    pub fn interactive(text: impl Into<String>) -> Self {
        Self {
            source: TurnSource::Interactive,
            text: text.into(),
        }
    }

    pub fn remote(text: impl Into<String>) -> Self {
        Self {
            source: TurnSource::Remote,
            text: text.into(),
        }
    }
}

/// Whether a turn generates a program from scratch or modifies the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Initial,
    Update,
}

/// A program accepted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedProgram {
    pub kind: TurnKind,
    pub code: String,
    pub version: u64,
    /// Whether the playback server acknowledged the push.
    pub pushed: bool,
}

pub type TurnOutcome = Result<AcceptedProgram, SessionError>;

/// Read-only view of the session for the "show current program" command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSnapshot {
    pub code: String,
    pub version: u64,
    pub delivered: bool,
}
