pub mod config;
pub mod downloader;

use downloader::{Downloader, Workspace, YtDlpBackend};

/// Wire the yt-dlp backend to the configured output directory
pub fn build_downloader(cfg: &config::AppConfig, workspace: &Workspace) -> Downloader {
    let backend = YtDlpBackend::new(cfg.ytdlp_path.clone(), cfg.timeout_secs);
    log::info!("Using yt-dlp at {}", backend.path());

    Downloader::new(Box::new(backend), workspace.output_dir.clone())
        .with_network(cfg.network_identity())
        .with_fallback(cfg.allow_fallback)
}
