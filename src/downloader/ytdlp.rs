// yt-dlp backend - drives the native `yt-dlp` binary
//
// One call downloads, merges/transcodes and prints the metadata record.
// `--dump-json --no-simulate` makes yt-dlp print the info JSON (including
// the filename it predicts before post-processing) and still download.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Command as StdCommand;

use super::errors::DownloadError;
use super::models::{MediaInfo, PostProcessor, RetrievalConfig};
use super::traits::RetrievalBackend;
use super::utils::{format_duration, run_output_with_timeout};

pub struct YtDlpBackend {
    ytdlp_path: String,
    timeout_secs: Option<u64>,
}

impl YtDlpBackend {
    pub fn new(ytdlp_path: Option<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.unwrap_or_else(find_ytdlp),
            timeout_secs,
        }
    }

    pub fn path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Build command arguments for a single attempt
    pub fn build_args(url: &str, config: &RetrievalConfig) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            config.format.clone(),
            "-o".to_string(),
            config.output_template.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
        ];

        if let Some(container) = &config.merge_container {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        if let Some(PostProcessor::ExtractAudio { codec, bitrate_kbps }) = &config.post_processor {
            args.extend(vec![
                "-x".to_string(),
                "--audio-format".to_string(),
                codec.clone(),
                "--audio-quality".to_string(),
                format!("{}K", bitrate_kbps),
            ]);
        }

        let net = &config.network;
        if let Some(addr) = &net.source_address {
            args.push("--source-address".to_string());
            args.push(addr.clone());
        }
        if let Some(ua) = &net.user_agent {
            args.push("--user-agent".to_string());
            args.push(ua.clone());
        }
        if !net.player_clients.is_empty() {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", net.player_clients.join(",")));
        }

        if let Some(cookies) = &config.cookie_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        }

        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl RetrievalBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn retrieve(&self, url: &str, config: &RetrievalConfig) -> Result<MediaInfo, DownloadError> {
        let args = Self::build_args(url, config);
        log::debug!("[yt-dlp] {} {}", self.ytdlp_path, args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, args, self.timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(error_summary(&stderr).into());
        }

        parse_media_info(&output.stdout)
    }
}

/// Keep the ERROR lines when there are any, otherwise the whole stderr
fn error_summary(stderr: &str) -> String {
    let important: Vec<&str> = stderr
        .lines()
        .map(|l| l.trim())
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    if important.is_empty() {
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            "yt-dlp exited with an error and no output".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        important.join("\n")
    }
}

/// Parse the info JSON yt-dlp printed; the last non-empty line wins
pub fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .ok_or_else(|| DownloadError::ParseError("Invalid JSON: yt-dlp printed no metadata".to_string()))?;

    let json: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

    let predicted_filename = json["_filename"]
        .as_str()
        .or_else(|| json["filename"].as_str())
        .map(PathBuf::from);

    Ok(MediaInfo {
        id: json["id"].as_str().unwrap_or("").to_string(),
        title: json["title"].as_str().unwrap_or("Media").to_string(),
        uploader: json["uploader"].as_str().unwrap_or("Unknown").to_string(),
        duration: format_duration(json["duration"].as_f64().unwrap_or(0.0)),
        thumbnail: json["thumbnail"].as_str().unwrap_or("").to_string(),
        predicted_filename,
    })
}

/// Find yt-dlp executable in common paths
pub fn find_ytdlp() -> String {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return path;
            }
        }
    }

    // Last resort: hope it's in PATH
    "yt-dlp".to_string()
}
