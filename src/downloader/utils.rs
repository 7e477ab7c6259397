// Helper functions shared by the backend, locator and startup code

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};

use super::errors::{DownloadError, Result};

lazy_static! {
    // Characters yt-dlp replaces when it turns a title into a filename
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Number of title characters used when matching files by name
pub const TITLE_PREFIX_LEN: usize = 16;

/// Run command, optionally bounded by a timeout
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: Option<u64>,
) -> Result<std::process::Output> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DownloadError::ToolNotFound(program.to_string()),
            _ => DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e)),
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("Failed to capture stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let status = match timeout_secs {
        Some(secs) => match timeout(TokioDuration::from_secs(secs), child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(DownloadError::ExecutionError(format!("Timed out after {}s", secs)));
            }
        },
        None => child.wait().await?,
    };

    let join_err = |e: tokio::task::JoinError| DownloadError::ExecutionError(format!("pipe reader failed: {}", e));
    let stdout = stdout_task.await.map_err(join_err)??;
    let stderr = stderr_task.await.map_err(join_err)??;

    Ok(std::process::Output { status, stdout, stderr })
}

/// Sanitizes a filename by replacing characters that are invalid on common filesystems
pub fn sanitize_filename(filename: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(filename, "_");
    WHITESPACE.replace_all(replaced.trim(), " ").to_string()
}

/// Leading part of a sanitized title, used to spot renamed output files
pub fn title_prefix(title: &str) -> Option<String> {
    let clean = sanitize_filename(title);
    if clean.is_empty() {
        return None;
    }
    Some(clean.chars().take(TITLE_PREFIX_LEN).collect())
}

/// `<dir>/%(title)s_<stamp>.%(ext)s` - two requests in the same second share a template
pub fn output_template(dir: &Path, stamp: i64) -> String {
    dir.join(format!("%(title)s_{}.%(ext)s", stamp))
        .to_string_lossy()
        .to_string()
}

/// Seconds since the epoch, the only disambiguator between requests
pub fn unix_timestamp() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Creates a directory if it doesn't exist
pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
        log::info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Format duration in seconds as m:ss
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0) as u64;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
