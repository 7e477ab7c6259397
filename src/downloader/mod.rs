// Downloader module - format resolution, retrieval ladder, output lookup

pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod locator;
pub mod models;
pub mod orchestrator;
pub mod startup;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod ytdlp;

pub use diagnostics::FailureKind;
pub use errors::DownloadError;
pub use format_selector::FormatSelector;
pub use models::{
    CredentialMaterial, DownloadRequest, MediaInfo, MediaKind, NetworkIdentity, QualityHint,
    RetrievalConfig, RetrievalResult,
};
pub use orchestrator::Downloader;
pub use startup::Workspace;
pub use traits::RetrievalBackend;
pub use ytdlp::YtDlpBackend;
