// FormatSelector - turns a request into a yt-dlp configuration
//
// Handles:
// - Stream selection expression per media kind and quality hint
// - Forced container for merged video
// - Audio transcode step
// - The conservative fallback used when the first attempt fails

use super::models::{
    DownloadRequest, MediaKind, NetworkIdentity, PostProcessor, QualityHint, RetrievalConfig,
    VIDEO_CONTAINER,
};

/// Single pre-merged stream, no merge needed
const SAFE_FORMAT: &str = "best";

pub struct FormatSelector;

impl FormatSelector {
    /// Get format spec for yt-dlp based on media kind and quality
    pub fn format_spec(kind: MediaKind, quality: QualityHint) -> String {
        match kind {
            MediaKind::Audio => "bestaudio/best".to_string(),
            MediaKind::Video => match (quality, quality.height_ceiling()) {
                (QualityHint::SafeMode, _) => SAFE_FORMAT.to_string(),
                (_, Some(h)) => format!("bestvideo[height<={}]+bestaudio/best[height<={}]", h, h),
                (_, None) => "bestvideo+bestaudio/best".to_string(),
            },
        }
    }

    /// Build the primary configuration for a request
    pub fn resolve(
        request: &DownloadRequest,
        output_template: &str,
        network: &NetworkIdentity,
    ) -> RetrievalConfig {
        let kind = request.kind();
        let quality = request.quality();

        let (merge_container, post_processor) = match kind {
            MediaKind::Audio => (None, Some(PostProcessor::mp3())),
            MediaKind::Video if quality == QualityHint::SafeMode => (None, None),
            MediaKind::Video => (Some(VIDEO_CONTAINER.to_string()), None),
        };

        RetrievalConfig {
            format: Self::format_spec(kind, quality),
            merge_container,
            post_processor,
            output_template: output_template.to_string(),
            network: network.clone(),
            cookie_file: request.credentials().map(|c| c.path.clone()),
        }
    }

    /// Conservative second rung: single best pre-merged stream, no forced container.
    /// Audio keeps its transcode so the result is still an mp3.
    pub fn fallback(primary: &RetrievalConfig) -> RetrievalConfig {
        RetrievalConfig {
            format: SAFE_FORMAT.to_string(),
            merge_container: None,
            ..primary.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::CredentialMaterial;
    use std::path::PathBuf;

    const TEMPLATE: &str = "downloads/%(title)s_1700000000.%(ext)s";

    fn all_hints() -> [QualityHint; 5] {
        [
            QualityHint::Best,
            QualityHint::P1080,
            QualityHint::P720,
            QualityHint::P480,
            QualityHint::SafeMode,
        ]
    }

    #[test]
    fn test_every_expression_ends_in_single_stream() {
        for kind in [MediaKind::Video, MediaKind::Audio] {
            for q in all_hints() {
                let spec = FormatSelector::format_spec(kind, q);
                let last = spec.rsplit('/').next().unwrap();
                assert!(!last.contains('+'), "{} has no single-stream fallback", spec);
                assert!(last.starts_with("best"), "{}", spec);
            }
        }
    }

    #[test]
    fn test_merged_expressions_have_fallback_term() {
        for q in [QualityHint::Best, QualityHint::P1080, QualityHint::P720, QualityHint::P480] {
            let spec = FormatSelector::format_spec(MediaKind::Video, q);
            let (merged, fallback) = spec.split_once('/').unwrap();
            assert!(merged.contains('+'));
            assert!(!fallback.contains('+'));
        }
        assert_eq!(FormatSelector::format_spec(MediaKind::Audio, QualityHint::Best), "bestaudio/best");
    }

    #[test]
    fn test_720_ceiling_in_both_subexpressions() {
        let spec = FormatSelector::format_spec(MediaKind::Video, QualityHint::P720);
        assert_eq!(spec, "bestvideo[height<=720]+bestaudio/best[height<=720]");
        let (merged, single) = spec.split_once('/').unwrap();
        assert!(merged.contains("[height<=720]"));
        assert!(single.contains("[height<=720]"));
    }

    #[test]
    fn test_each_ceiling_uses_its_own_height() {
        assert_eq!(
            FormatSelector::format_spec(MediaKind::Video, QualityHint::P1080),
            "bestvideo[height<=1080]+bestaudio/best[height<=1080]"
        );
        assert_eq!(
            FormatSelector::format_spec(MediaKind::Video, QualityHint::P480),
            "bestvideo[height<=480]+bestaudio/best[height<=480]"
        );
        assert_eq!(FormatSelector::format_spec(MediaKind::Video, QualityHint::Best), "bestvideo+bestaudio/best");
        assert_eq!(FormatSelector::format_spec(MediaKind::Video, QualityHint::SafeMode), "best");
    }

    #[test]
    fn test_audio_ignores_quality() {
        assert_eq!(
            FormatSelector::format_spec(MediaKind::Audio, QualityHint::P480),
            FormatSelector::format_spec(MediaKind::Audio, QualityHint::Best)
        );
    }

    #[test]
    fn test_audio_has_transcode_step() {
        let req = DownloadRequest::new("https://youtu.be/x", MediaKind::Audio);
        let cfg = FormatSelector::resolve(&req, TEMPLATE, &NetworkIdentity::default());
        assert_eq!(
            cfg.post_processor,
            Some(PostProcessor::ExtractAudio { codec: "mp3".to_string(), bitrate_kbps: 192 })
        );
        assert_eq!(cfg.merge_container, None);
        assert_eq!(cfg.expected_extension(), Some("mp3"));
    }

    #[test]
    fn test_video_container_forcing() {
        let best = DownloadRequest::new("u", MediaKind::Video);
        let cfg = FormatSelector::resolve(&best, TEMPLATE, &NetworkIdentity::default());
        assert_eq!(cfg.merge_container.as_deref(), Some("mp4"));

        let safe = DownloadRequest::new("u", MediaKind::Video).with_quality(Some(QualityHint::SafeMode));
        let cfg = FormatSelector::resolve(&safe, TEMPLATE, &NetworkIdentity::default());
        assert_eq!(cfg.merge_container, None);
        assert_eq!(cfg.format, "best");
        assert_eq!(cfg.expected_extension(), None);
    }

    #[test]
    fn test_credentials_attached() {
        let cred = CredentialMaterial { path: PathBuf::from("cookies.txt"), size: 10 };
        let req = DownloadRequest::new("u", MediaKind::Video).with_credentials(Some(cred));
        let cfg = FormatSelector::resolve(&req, TEMPLATE, &NetworkIdentity::default());
        assert_eq!(cfg.cookie_file, Some(PathBuf::from("cookies.txt")));

        let fb = FormatSelector::fallback(&cfg);
        assert_eq!(fb.cookie_file, Some(PathBuf::from("cookies.txt")));
    }

    #[test]
    fn test_fallback_is_conservative() {
        let req = DownloadRequest::new("u", MediaKind::Video).with_quality(Some(QualityHint::P1080));
        let primary = FormatSelector::resolve(&req, TEMPLATE, &NetworkIdentity::default());
        let fb = FormatSelector::fallback(&primary);
        assert_eq!(fb.format, "best");
        assert_eq!(fb.merge_container, None);
        assert_eq!(fb.output_template, primary.output_template);
    }
}
