// Failure diagnostics - maps a failed request onto a known category
//
// yt-dlp only hands back a human-readable message, so categories are
// recognised by substring match on that message.

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// HTTP 403 or "Sign in" required
    AuthRequired,

    /// No stream matched the format expression
    FormatUnavailable,

    /// Retrieval reported success but no file could be found on disk
    FileMissing,

    /// 429 / too many requests
    RateLimited,

    /// Video deleted, private or otherwise gone
    Unavailable,

    /// yt-dlp or ffmpeg missing
    ToolMissing,

    Other,
}

impl FailureKind {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Access denied (HTTP 403 / sign-in required)",
            Self::FormatUnavailable => "Requested format is not available",
            Self::FileMissing => "Downloaded file not found",
            Self::RateLimited => "Rate limited",
            Self::Unavailable => "Video unavailable",
            Self::ToolMissing => "Required tool missing",
            Self::Other => "Download failed",
        }
    }

    /// What the user can do about it, if anything
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::AuthRequired => Some(
                "The site wants a signed-in session.\n\
                 Export cookies.txt from a logged-in browser and pass it with --cookies,\n\
                 or refresh the existing file if it is older than a few days.",
            ),
            Self::RateLimited => Some("Wait 10-15 minutes and try again."),
            Self::ToolMissing => Some("Install yt-dlp and ffmpeg and make sure they are on PATH."),
            Self::FormatUnavailable | Self::FileMissing | Self::Unavailable | Self::Other => None,
        }
    }
}

/// Analyze error message and return the failure category
pub fn diagnose_error(error: &str) -> FailureKind {
    let lower = error.to_lowercase();

    if lower.contains("403") || lower.contains("sign in") || lower.contains("forbidden") {
        return FailureKind::AuthRequired;
    }

    if lower.contains("requested format is not available") || lower.contains("no video formats found") {
        return FailureKind::FormatUnavailable;
    }

    if lower.contains("429") || lower.contains("too many requests") || lower.contains("rate limit") {
        return FailureKind::RateLimited;
    }

    if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("video has been removed")
        || lower.contains("this video is no longer available")
    {
        return FailureKind::Unavailable;
    }

    FailureKind::Other
}

/// Typed errors carry their category already; everything else goes through the message
pub fn classify(error: &DownloadError) -> FailureKind {
    match error {
        DownloadError::AuthRequired(_) => FailureKind::AuthRequired,
        DownloadError::FormatUnavailable(_) => FailureKind::FormatUnavailable,
        DownloadError::FileMissing(_) => FailureKind::FileMissing,
        DownloadError::ToolNotFound(_) => FailureKind::ToolMissing,
        other => diagnose_error(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_detection() {
        let error = "ERROR: HTTP Error 403: Forbidden";
        assert_eq!(diagnose_error(error), FailureKind::AuthRequired);
    }

    #[test]
    fn test_sign_in_detection() {
        let error = "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot";
        assert_eq!(diagnose_error(error), FailureKind::AuthRequired);
        assert!(FailureKind::AuthRequired.remediation().unwrap().contains("cookies"));
    }

    #[test]
    fn test_format_detection() {
        let error = "ERROR: [youtube] abc: Requested format is not available. Use --list-formats";
        assert_eq!(diagnose_error(error), FailureKind::FormatUnavailable);
    }

    #[test]
    fn test_rate_limit_detection() {
        assert_eq!(diagnose_error("HTTP Error 429: Too Many Requests"), FailureKind::RateLimited);
    }

    #[test]
    fn test_file_missing_has_no_remediation() {
        let err = DownloadError::FileMissing("downloads/x_1.mp4".to_string());
        let kind = classify(&err);
        assert_eq!(kind, FailureKind::FileMissing);
        assert!(kind.remediation().is_none());
    }

    #[test]
    fn test_unknown_message() {
        assert_eq!(diagnose_error("segfault in the matrix"), FailureKind::Other);
    }
}
