use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::downloader::errors::Result;
use crate::downloader::NetworkIdentity;

const CONFIG_FILE: &str = "universal-downloader.toml";
const ENV_PREFIX: &str = "UDL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub cookies_file: PathBuf,
    /// Explicit yt-dlp binary; searched for when unset
    pub ytdlp_path: Option<String>,
    /// Retry once with a single pre-merged stream when the first attempt fails
    pub allow_fallback: bool,
    /// No limit unless set
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub source_address: Option<String>,
    pub player_clients: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            cookies_file: PathBuf::from("cookies.txt"),
            ytdlp_path: None,
            allow_fallback: true,
            timeout_secs: None,
            user_agent: None,
            // forces IPv4
            source_address: Some("0.0.0.0".to_string()),
            player_clients: vec!["android".to_string(), "ios".to_string()],
        }
    }
}

impl AppConfig {
    /// Defaults, then the user config file, then ./universal-downloader.toml
    /// (or `explicit`), then `UDL_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(user_file) = Self::user_config_path() {
            builder = builder.add_source(config::File::from(user_file).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::from(Path::new(CONFIG_FILE)).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("player_clients"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("universal-downloader").join("config.toml"))
    }

    pub fn network_identity(&self) -> NetworkIdentity {
        NetworkIdentity {
            user_agent: self.user_agent.clone(),
            source_address: self.source_address.clone().filter(|s| !s.is_empty()),
            player_clients: self.player_clients.clone(),
        }
    }
}
