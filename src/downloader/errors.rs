// Error types for the retrieval pipeline

use thiserror::Error;

use super::diagnostics::{diagnose_error, FailureKind};

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp or ffmpeg not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Site refused the request (HTTP 403, "Sign in" required)
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// The selected format expression matched nothing
    #[error("Format unavailable: {0}")]
    FormatUnavailable(String),

    /// yt-dlp reported success but the output file is gone or empty
    #[error("Downloaded file not found: {0}")]
    FileMissing(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Unknown error with details
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        // A missing binary surfaces at spawn as io NotFound, never through here
        match diagnose_error(&s) {
            FailureKind::AuthRequired => Self::AuthRequired(s),
            FailureKind::FormatUnavailable => Self::FormatUnavailable(s),
            _ if s.contains("Invalid JSON") => Self::ParseError(s),
            _ => Self::Unknown(s),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
