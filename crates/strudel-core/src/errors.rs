//! Error types for the live-coding session
//!
//! Every collaborator failure is caught at the boundary of the component that
//! called the collaborator and turned into one of these variants. Only
//! configuration failures are fatal; everything else is reported on the turn
//! that produced it and the session carries on.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(String),
    /// No model credential; carries the environment variable that was checked.
    #[error("Gemini API key is required. Set the {0} environment variable")]
    MissingCredential(String),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Model returned no usable code")]
    EmptyCompletion,
    #[error("I/O error: {0}")]
    Io(String),
}

impl SessionError {
    /// True for failures that should stop the process before a session starts.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Config(_) | SessionError::MissingCredential(_))
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Generation(err.to_string())
    }
}

impl From<serde_yaml::Error> for SessionError {
    fn from(err: serde_yaml::Error) -> Self {
        SessionError::Config(format!("Invalid configuration file: {}", err))
    }
}
