//! Error types for quicpulse-exec

use thiserror::Error;

/// Main error type for quicpulse-exec
#[derive(Error, Debug)]
pub enum QuicpulseError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Malformed curl/batch script or request URL
    #[error("Format error: {0}")]
    Format(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("SSL error: {0}")]
    Ssl(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// Failure disposing a retained response; logged, never propagated out of a run
    #[error("Release error: {0}")]
    Release(String),

    #[error("Cancelled")]
    Cancelled,
}

impl QuicpulseError {
    /// Shorthand for a [`QuicpulseError::Format`] error
    pub fn format(message: impl Into<String>) -> Self {
        QuicpulseError::Format(message.into())
    }

    /// Whether the error was raised before any network activity
    pub fn is_format(&self) -> bool {
        matches!(self, QuicpulseError::Format(_) | QuicpulseError::UrlParse(_))
    }
}

pub type Result<T> = std::result::Result<T, QuicpulseError>;
