use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;

use universal_downloader_lib::build_downloader;
use universal_downloader_lib::config::AppConfig;
use universal_downloader_lib::downloader::tools::ToolManager;
use universal_downloader_lib::downloader::{DownloadRequest, MediaKind, QualityHint, Workspace};

#[derive(Parser)]
#[command(name = "universal-downloader", version, about = "Paste a URL, get a video or an mp3")]
struct Cli {
    /// Config file (defaults to ./universal-downloader.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a single URL
    Download {
        url: String,

        /// Extract audio and transcode to mp3
        #[arg(long)]
        audio: bool,

        /// best, 1080p, 720p, 480p or safe
        #[arg(long, short)]
        quality: Option<QualityHint>,

        /// cookies.txt to install before downloading; replaces the configured cookie file
        #[arg(long)]
        cookies: Option<PathBuf>,

        #[arg(long, short)]
        output_dir: Option<PathBuf>,

        /// Single attempt, no conservative retry
        #[arg(long)]
        no_fallback: bool,
    },
    /// Show yt-dlp / ffmpeg status
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!("Configuration loaded");

    match cli.command {
        Command::Tools => {
            let manager = ToolManager::new().with_ytdlp_path(config.ytdlp_path.clone());
            let mut all_ok = true;
            for tool in manager.get_all_tools() {
                all_ok &= tool.is_available;
                println!(
                    "{:<8} {:<10} {}",
                    tool.name,
                    tool.version.as_deref().unwrap_or("missing"),
                    tool.path.as_deref().unwrap_or("-")
                );
            }
            Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Download { url, audio, quality, cookies, output_dir, no_fallback } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if no_fallback {
                config.allow_fallback = false;
            }

            let mut workspace = Workspace::prepare(&config.output_dir, &config.cookies_file).await?;
            if let Some(upload) = cookies {
                let blob = tokio::fs::read(&upload)
                    .await
                    .with_context(|| format!("reading cookie file {}", upload.display()))?;
                workspace.install_cookie_blob(&blob).await?;
            }

            let kind = if audio { MediaKind::Audio } else { MediaKind::Video };
            let request = DownloadRequest::new(url, kind)
                .with_quality(quality)
                .with_credentials(workspace.credentials.clone());

            let downloader = build_downloader(&config, &workspace);
            let result = downloader.download(&request).await;

            if result.is_success() {
                if let Some(path) = &result.path {
                    println!("path:  {}", path.display());
                }
                println!("title: {}", result.title.as_deref().unwrap_or("Media"));
                println!("mime:  {}", result.mime_type());
                if result.used_fallback {
                    println!("note:  saved with the fallback format");
                }
                return Ok(ExitCode::SUCCESS);
            }

            eprintln!("Download failed");
            if let Some(err) = &result.error {
                eprintln!("{}", err);
            }
            if let Some(hint) = result.hint() {
                eprintln!("\n{}", hint);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
