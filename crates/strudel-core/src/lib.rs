//! Core library for a conversational Strudel live-coding agent.
//!
//! A session turns natural-language requests into Strudel pattern programs,
//! one turn at a time, and keeps a remote playback server in sync with the
//! latest accepted program.
//!
//! # Architecture Overview
//!
//! - **Generation**: prompt construction around a provider-agnostic `LLM` trait
//! - **Sanitizing**: reduces a raw completion to runnable code
//! - **Memory**: a sliding window of past request/reply exchanges
//! - **Playback link**: best-effort REST calls to the playback server
//! - **Session**: the single-flight turn protocol and program versioning
//! - **Multiplexer**: merges operator input with prompts queued on the server
//! - **Configuration**: YAML file plus environment overrides

pub mod config;
pub mod core_types;
pub mod errors;
pub mod generation;
pub mod llm;
pub mod memory;
pub mod multiplexer;
pub mod playback;
pub mod report;
pub mod sanitizer;
pub mod session;

pub use config::*;
pub use core_types::{AcceptedProgram, ProgramSnapshot, Turn, TurnKind, TurnOutcome, TurnSource};
pub use errors::SessionError;
pub use generation::GenerationClient;
pub use llm::LLM;
pub use multiplexer::{InputCommand, InputMultiplexer};
pub use playback::PlaybackLink;
pub use report::SessionReporter;
pub use session::{Session, SessionController};

#[cfg(test)]
pub mod test_utils;
