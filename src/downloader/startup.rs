// One-time startup checks: output directory and cookie file

use std::path::{Path, PathBuf};

use super::errors::Result;
use super::models::CredentialMaterial;
use super::utils::ensure_dir_exists;

pub const MISSING_COOKIES_WARNING: &str = "cookie file not found; 403 errors likely";

/// State established once per process
#[derive(Debug, Clone)]
pub struct Workspace {
    pub output_dir: PathBuf,
    pub cookies_file: PathBuf,
    pub credentials: Option<CredentialMaterial>,
}

impl Workspace {
    /// Create the output directory (no-op if present) and look for the cookie file
    pub async fn prepare(output_dir: &Path, cookies_file: &Path) -> Result<Self> {
        ensure_dir_exists(output_dir).await?;

        let credentials = CredentialMaterial::from_path(cookies_file);
        match &credentials {
            Some(c) => log::info!("Found {:?} ({} bytes), using authentication", c.path, c.size),
            None => log::warn!("{:?}: {}", cookies_file, MISSING_COOKIES_WARNING),
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            cookies_file: cookies_file.to_path_buf(),
            credentials,
        })
    }

    /// Store an uploaded cookie blob at the configured cookie path
    pub async fn install_cookie_blob(&mut self, blob: &[u8]) -> Result<CredentialMaterial> {
        if let Some(parent) = self.cookies_file.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir_exists(parent).await?;
            }
        }
        if self.cookies_file.is_file() {
            log::warn!("Replacing existing cookie file {:?}", self.cookies_file);
        }
        tokio::fs::write(&self.cookies_file, blob).await?;

        let cred = CredentialMaterial {
            path: self.cookies_file.clone(),
            size: blob.len() as u64,
        };
        log::info!("Installed cookie file {:?} ({} bytes)", cred.path, cred.size);
        self.credentials = Some(cred.clone());
        Ok(cred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_without_cookies() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("downloads");
        let ws = Workspace::prepare(&out, &tmp.path().join("cookies.txt")).await.unwrap();
        assert!(out.is_dir());
        assert!(ws.credentials.is_none());

        // second run is fine
        Workspace::prepare(&out, &tmp.path().join("cookies.txt")).await.unwrap();
    }

    #[tokio::test]
    async fn test_prepare_detects_cookies() {
        let tmp = tempfile::tempdir().unwrap();
        let cookies = tmp.path().join("cookies.txt");
        std::fs::write(&cookies, "abc").unwrap();

        let ws = Workspace::prepare(&tmp.path().join("dl"), &cookies).await.unwrap();
        assert_eq!(ws.credentials.map(|c| c.size), Some(3));
    }

    #[tokio::test]
    async fn test_install_cookie_blob() {
        let tmp = tempfile::tempdir().unwrap();
        let cookies = tmp.path().join("auth").join("cookies.txt");
        let mut ws = Workspace::prepare(&tmp.path().join("dl"), &cookies).await.unwrap();

        let cred = ws.install_cookie_blob(b".youtube.com\tTRUE\t/\tTRUE\t0\tSID\tx\n").await.unwrap();
        assert!(cookies.is_file());
        assert_eq!(ws.credentials, Some(cred));
    }

    #[tokio::test]
    async fn test_install_replaces_existing_cookies() {
        let tmp = tempfile::tempdir().unwrap();
        let cookies = tmp.path().join("cookies.txt");
        std::fs::write(&cookies, "stale session").unwrap();
        let mut ws = Workspace::prepare(&tmp.path().join("dl"), &cookies).await.unwrap();
        assert_eq!(ws.credentials.as_ref().map(|c| c.size), Some(13));

        let cred = ws.install_cookie_blob(b"fresh").await.unwrap();
        assert_eq!(cred.size, 5);
        assert_eq!(std::fs::read(&cookies).unwrap(), b"fresh");
    }
}
