// Output locator - find the file yt-dlp actually left on disk
//
// yt-dlp predicts a filename before post-processing; transcoding and
// merging can change the extension afterwards. Best effort only.

use std::path::{Path, PathBuf};

use super::utils::title_prefix;

/// Leftovers of an interrupted or in-progress download
const PARTIAL_SUFFIXES: [&str; 3] = [".part", ".ytdl", ".temp"];

/// Resolve the final artifact.
///
/// 1. predicted filename with its extension swapped for `expected_ext`
///    (kept as-is when `None`)
/// 2. first entry in `dir` whose name contains `stamp`
/// 3. first entry in `dir` whose name starts with the title prefix
pub fn locate_output(
    predicted: Option<&Path>,
    expected_ext: Option<&str>,
    stamp: i64,
    title: Option<&str>,
    dir: &Path,
) -> Option<PathBuf> {
    if let Some(predicted) = predicted {
        let candidate = match expected_ext {
            Some(ext) => predicted.with_extension(ext),
            None => predicted.to_path_buf(),
        };
        if candidate.is_file() {
            return Some(candidate);
        }
        log::debug!("[Locator] {:?} not on disk, scanning {:?}", candidate, dir);
    }

    let entries = scan_dir(dir);

    let stamp = stamp.to_string();
    if let Some(hit) = entries.iter().find(|(name, _)| name.contains(&stamp)) {
        return Some(hit.1.clone());
    }

    let prefix = title.and_then(title_prefix)?;
    let (_, path) = entries.into_iter().find(|(name, _)| name.starts_with(&prefix))?;
    log::warn!("[Locator] no file carries stamp {}; using title match {:?}, may be from an earlier run", stamp, path);
    Some(path)
}

/// Regular, finished files in `dir`, sorted by name
fn scan_dir(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut entries: Vec<(String, PathBuf)> = read
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| (e.file_name().to_string_lossy().to_string(), e.path()))
        .filter(|(name, _)| !PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)))
        .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STAMP: i64 = 1_700_000_000;

    #[test]
    fn test_extension_swap() {
        let tmp = tempfile::tempdir().unwrap();
        let mp3 = tmp.path().join("video_1700000000.mp3");
        fs::write(&mp3, b"ID3").unwrap();

        let predicted = tmp.path().join("video_1700000000.webm");
        let found = locate_output(Some(&predicted), Some("mp3"), STAMP, None, tmp.path());
        assert_eq!(found, Some(mp3));
    }

    #[test]
    fn test_falls_back_to_stamp_scan() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("other_1.mp4"), b"x").unwrap();
        let renamed = tmp.path().join("video_1700000000.m4a");
        fs::write(&renamed, b"x").unwrap();

        let predicted = tmp.path().join("video_1700000000.webm");
        let found = locate_output(Some(&predicted), Some("mp3"), STAMP, None, tmp.path());
        assert_eq!(found, Some(renamed));
    }

    #[test]
    fn test_keeps_extension_when_none_expected() {
        let tmp = tempfile::tempdir().unwrap();
        let webm = tmp.path().join("clip_1700000000.webm");
        fs::write(&webm, b"x").unwrap();

        let found = locate_output(Some(&webm), None, STAMP, None, tmp.path());
        assert_eq!(found, Some(webm));
    }

    #[test]
    fn test_skips_partial_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("video_1700000000.mp4.part"), b"x").unwrap();

        let predicted = tmp.path().join("video_1700000000.mp4");
        assert_eq!(locate_output(Some(&predicted), Some("mp4"), STAMP, None, tmp.path()), None);
    }

    #[test]
    fn test_title_prefix_match() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("My Holiday Video in Spain_1699999999.mp4");
        fs::write(&file, b"x").unwrap();

        let found = locate_output(None, Some("mp4"), STAMP, Some("My Holiday Video in Spain"), tmp.path());
        assert_eq!(found, Some(file));
    }

    #[test]
    fn test_stamp_beats_older_title_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Song_1600000000.mp3"), b"old").unwrap();
        let fresh = tmp.path().join("Song_1700000000.m4a");
        fs::write(&fresh, b"new").unwrap();

        let found = locate_output(None, Some("mp3"), STAMP, Some("Song"), tmp.path());
        assert_eq!(found, Some(fresh));
    }

    #[test]
    fn test_oldest_title_match_wins_without_stamp() {
        let tmp = tempfile::tempdir().unwrap();
        let older = tmp.path().join("Song_1500000000.mp3");
        fs::write(&older, b"x").unwrap();
        fs::write(tmp.path().join("Song_1600000000.mp3"), b"x").unwrap();

        let found = locate_output(None, Some("mp3"), STAMP, Some("Song"), tmp.path());
        assert_eq!(found, Some(older));
    }

    #[test]
    fn test_nothing_found() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(locate_output(None, Some("mp4"), STAMP, Some("x"), tmp.path()), None);
        assert_eq!(locate_output(None, None, STAMP, None, &tmp.path().join("missing")), None);
    }
}
