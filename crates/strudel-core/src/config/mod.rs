//! Configuration for the live-coding agent
//!
//! An `AgentConfig` is built once at startup (defaults, optional YAML file,
//! environment, command line) and handed explicitly to the generation client
//! and the playback link.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;
