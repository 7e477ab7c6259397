// Orchestrator with fallback logic
//
// The ladder is a fixed, ordered list of at most two configurations:
// the requested one and a conservative single-stream fallback. The first
// success wins; if every rung fails the last error is surfaced.

use std::path::{Path, PathBuf};

use super::diagnostics::classify;
use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::locator::locate_output;
use super::models::{DownloadRequest, MediaInfo, NetworkIdentity, RetrievalConfig, RetrievalResult};
use super::startup::MISSING_COOKIES_WARNING;
use super::traits::RetrievalBackend;
use super::utils::{output_template, unix_timestamp};

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

pub struct Downloader {
    backend: Box<dyn RetrievalBackend>,
    output_dir: PathBuf,
    network: NetworkIdentity,
    allow_fallback: bool,
    clock: Clock,
}

impl Downloader {
    pub fn new(backend: Box<dyn RetrievalBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
            network: NetworkIdentity::default(),
            allow_fallback: true,
            clock: Box::new(unix_timestamp),
        }
    }

    pub fn with_network(mut self, network: NetworkIdentity) -> Self {
        self.network = network;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.allow_fallback = enabled;
        self
    }

    /// Replace the seconds-since-epoch source used in output names
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Ordered configurations to try for `request`
    pub fn ladder(&self, request: &DownloadRequest, stamp: i64) -> Vec<RetrievalConfig> {
        let template = output_template(&self.output_dir, stamp);
        let primary = FormatSelector::resolve(request, &template, &self.network);

        let mut ladder = vec![primary];
        if self.allow_fallback {
            let fallback = FormatSelector::fallback(&ladder[0]);
            // safe mode already is the fallback
            if fallback != ladder[0] {
                ladder.push(fallback);
            }
        }
        ladder
    }

    /// Run one request to completion. Never fails: errors come back inside the result.
    pub async fn download(&self, request: &DownloadRequest) -> RetrievalResult {
        let stamp = (self.clock)();
        let mut result = RetrievalResult {
            kind: request.kind(),
            path: None,
            title: None,
            error: None,
            failure: None,
            attempts: 0,
            used_fallback: false,
            warnings: Vec::new(),
        };

        if request.credentials().is_none() {
            log::warn!("[Downloader] {}", MISSING_COOKIES_WARNING);
            result.warnings.push(MISSING_COOKIES_WARNING.to_string());
        }

        let ladder = self.ladder(request, stamp);
        let total = ladder.len();
        let mut last_error: Option<DownloadError> = None;
        let mut success: Option<(MediaInfo, &RetrievalConfig)> = None;

        for (idx, config) in ladder.iter().enumerate() {
            result.attempts = idx + 1;
            log::info!(
                "[Downloader] {} attempt {}/{} with {}: -f {}",
                request.kind(),
                idx + 1,
                total,
                self.backend.name(),
                config.format
            );

            match self.backend.retrieve(request.url(), config).await {
                Ok(info) => {
                    log::info!("[Downloader] ✓ retrieved '{}'", info.title);
                    result.used_fallback = idx > 0;
                    success = Some((info, config));
                    break;
                }
                Err(e) => {
                    log::warn!("[Downloader] ✗ attempt {}/{} failed: {}", idx + 1, total, e);
                    last_error = Some(e);
                }
            }
        }

        let Some((info, config)) = success else {
            let error = last_error
                .unwrap_or_else(|| DownloadError::Unknown("no retrieval attempted".to_string()));
            return fail(result, error);
        };

        result.title = Some(info.title.clone());

        let located = locate_output(
            info.predicted_filename.as_deref(),
            config.expected_extension(),
            stamp,
            Some(&info.title),
            &self.output_dir,
        );

        match located {
            Some(path) if is_non_empty(&path) => {
                log::info!("[Downloader] ✓ saved {:?}", path);
                result.path = Some(path);
                result
            }
            Some(path) => fail(result, DownloadError::FileMissing(format!("{} is empty", path.display()))),
            None => {
                let predicted = info
                    .predicted_filename
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("*{}*", stamp));
                fail(result, DownloadError::FileMissing(predicted))
            }
        }
    }
}

fn fail(mut result: RetrievalResult, error: DownloadError) -> RetrievalResult {
    let kind = classify(&error);
    log::error!("[Downloader] {}: {}", kind.description(), error);
    result.failure = Some(kind);
    result.error = Some(error.to_string());
    result.path = None;
    result
}

fn is_non_empty(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}
