//! Error types for codetype.

use thiserror::Error;

/// Errors raised outside the scoring core: loading targets, reading config,
/// and setting up logging. The reducer and sampler never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a snippet, config or log file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be serialized or parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config values that would break the session loop.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// No bundled snippet matches the requested language.
    #[error("no snippet found for language: {0}")]
    SnippetNotFound(String),

    /// The target text is empty, there is nothing to type.
    #[error("target text is empty")]
    EmptyTarget,

    /// Subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging { message: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
