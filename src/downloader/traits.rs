// Retrieval backend trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{MediaInfo, RetrievalConfig};

/// Something that can fetch `url` according to `config` and write the result to disk
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Download and post-process; returns the metadata record with the predicted filename
    async fn retrieve(&self, url: &str, config: &RetrievalConfig) -> Result<MediaInfo, DownloadError>;
}
