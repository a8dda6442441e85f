//! Error types for hackertrace.

use std::io;

/// Errors produced by the hackertrace engine.
#[derive(Debug, thiserror::Error)]
pub enum HackerError {
    #[error("Unknown command. Try: help")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("Unknown city: {input}. Try: {known}")]
    UnknownCity { input: String, known: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("typing run already finished")]
    AlreadyFinished,

    #[error("typing run has not started")]
    NotStarted,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HackerError {
    /// Shorthand for a usage error.
    pub fn usage(text: impl Into<String>) -> Self {
        Self::Usage(text.into())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HackerError>;
