use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    /// Needed for merging and the mp3 transcode
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

#[derive(Default)]
pub struct ToolManager {
    ytdlp_override: Option<String>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a configured yt-dlp path instead of searching
    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_override = path;
        self
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let (path, version) = self.detect_tool(tool_type);

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            version,
            is_available: path.is_some(),
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }

    fn detect_tool(&self, tool_type: ToolType) -> (Option<String>, Option<String>) {
        if tool_type == ToolType::YtDlp {
            if let Some(path) = &self.ytdlp_override {
                let version = get_version(path, tool_type);
                let found = version.is_some().then(|| path.clone());
                return (found, version);
            }
        }

        let binary_name = tool_type.as_str();

        // 1. Try common paths first
        let common_paths = [
            format!("/opt/homebrew/bin/{}", binary_name),
            format!("/usr/local/bin/{}", binary_name),
            format!("/usr/bin/{}", binary_name),
        ];

        for path in common_paths {
            if std::path::Path::new(&path).exists() {
                let version = get_version(&path, tool_type);
                return (Some(path), version);
            }
        }

        // 2. Try PATH
        if let Ok(output) = Command::new("which").arg(binary_name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    let version = get_version(&path, tool_type);
                    return (Some(path), version);
                }
            }
        }

        (None, None)
    }
}

fn get_version(path: &str, tool_type: ToolType) -> Option<String> {
    match Command::new(path).arg(tool_type.version_arg()).output() {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout);
            out.lines().next().map(|l| parse_version_line(tool_type, l))
        }
        _ => None,
    }
}

/// "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"; yt-dlp prints the bare version
fn parse_version_line(tool_type: ToolType, line: &str) -> String {
    let line = line.trim();
    match tool_type {
        ToolType::YtDlp => line.to_string(),
        ToolType::Ffmpeg => line
            .strip_prefix("ffmpeg version ")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or(line)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffmpeg_version() {
        let line = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers";
        assert_eq!(parse_version_line(ToolType::Ffmpeg, line), "6.1.1-3ubuntu5");
    }

    #[test]
    fn test_parse_ytdlp_version() {
        assert_eq!(parse_version_line(ToolType::YtDlp, "2024.08.06\n"), "2024.08.06");
    }

    #[test]
    fn test_bogus_override_is_unavailable() {
        let manager = ToolManager::new().with_ytdlp_path(Some("/nonexistent/yt-dlp".to_string()));
        let info = manager.get_tool_info(ToolType::YtDlp);
        assert!(!info.is_available);
        assert!(info.version.is_none());
    }
}
