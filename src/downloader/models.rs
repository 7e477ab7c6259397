// Common data models for the downloader

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::diagnostics::FailureKind;

/// Codec every audio request is transcoded to
pub const AUDIO_CODEC: &str = "mp3";
/// Target bitrate of the audio transcode, in kbps
pub const AUDIO_BITRATE_KBPS: u32 = 192;
/// Container forced on merged video output
pub const VIDEO_CONTAINER: &str = "mp4";

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// MIME type handed to whoever serves the file back
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Video => "video/mp4",
            Self::Audio => "audio/mpeg",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Quality hint for video requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityHint {
    #[default]
    Best,
    P1080,
    P720,
    P480,
    /// Single pre-merged stream, whatever container it comes in
    SafeMode,
}

impl QualityHint {
    /// Height ceiling in pixels, if any
    pub fn height_ceiling(&self) -> Option<u32> {
        match self {
            Self::P1080 => Some(1080),
            Self::P720 => Some(720),
            Self::P480 => Some(480),
            Self::Best | Self::SafeMode => None,
        }
    }
}

impl FromStr for QualityHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "1080p" | "1080" => Ok(Self::P1080),
            "720p" | "720" => Ok(Self::P720),
            "480p" | "480" => Ok(Self::P480),
            "safe" | "safe-mode" | "safemode" => Ok(Self::SafeMode),
            other => Err(format!("unknown quality '{}' (expected best, 1080p, 720p, 480p or safe)", other)),
        }
    }
}

impl fmt::Display for QualityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::P1080 => write!(f, "1080p"),
            Self::P720 => write!(f, "720p"),
            Self::P480 => write!(f, "480p"),
            Self::SafeMode => write!(f, "safe"),
        }
    }
}

/// A Netscape-format cookie file handed to yt-dlp as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialMaterial {
    pub path: PathBuf,
    pub size: u64,
}

impl CredentialMaterial {
    /// Returns `None` when the file does not exist
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).ok()?;
        if !meta.is_file() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            size: meta.len(),
        })
    }
}

/// One user submission
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    url: String,
    kind: MediaKind,
    quality: Option<QualityHint>,
    credentials: Option<CredentialMaterial>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            kind,
            quality: None,
            credentials: None,
        }
    }

    pub fn with_quality(mut self, quality: Option<QualityHint>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<CredentialMaterial>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Missing hint means best
    pub fn quality(&self) -> QualityHint {
        self.quality.unwrap_or_default()
    }

    pub fn credentials(&self) -> Option<&CredentialMaterial> {
        self.credentials.as_ref()
    }
}

/// Post-retrieval transcode step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    ExtractAudio { codec: String, bitrate_kbps: u32 },
}

impl PostProcessor {
    pub fn mp3() -> Self {
        Self::ExtractAudio {
            codec: AUDIO_CODEC.to_string(),
            bitrate_kbps: AUDIO_BITRATE_KBPS,
        }
    }

    pub fn output_extension(&self) -> &str {
        match self {
            Self::ExtractAudio { codec, .. } => codec,
        }
    }
}

/// How we present ourselves to the site
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkIdentity {
    pub user_agent: Option<String>,
    /// `0.0.0.0` forces IPv4
    pub source_address: Option<String>,
    /// YouTube player clients, e.g. android, ios
    pub player_clients: Vec<String>,
}

/// Everything yt-dlp needs for a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub format: String,
    pub merge_container: Option<String>,
    pub post_processor: Option<PostProcessor>,
    pub output_template: String,
    pub network: NetworkIdentity,
    pub cookie_file: Option<PathBuf>,
}

impl RetrievalConfig {
    /// Extension the finished file should carry, `None` means keep what yt-dlp picked
    pub fn expected_extension(&self) -> Option<&str> {
        if let Some(pp) = &self.post_processor {
            return Some(pp.output_extension());
        }
        self.merge_container.as_deref()
    }
}

/// Metadata record returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub uploader: String,
    pub duration: String,
    pub thumbnail: String,
    /// Filename yt-dlp predicted before any post-processing
    pub predicted_filename: Option<PathBuf>,
}

/// Outcome of one request
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub kind: MediaKind,
    pub path: Option<PathBuf>,
    pub title: Option<String>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
    pub attempts: usize,
    pub used_fallback: bool,
    pub warnings: Vec<String>,
}

impl RetrievalResult {
    pub fn is_success(&self) -> bool {
        self.path.is_some() && self.error.is_none()
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }

    /// Remediation hint for the failure, if the category has one
    pub fn hint(&self) -> Option<&'static str> {
        self.failure.and_then(|f| f.remediation())
    }

    /// Filename offered in the save-as dialog
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }
}
