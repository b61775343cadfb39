//! Local platform capabilities
//!
//! The orchestrator touches the local machine in exactly two ways: saving a
//! rendered artifact under a filename, and handing a link to an external
//! viewer. Both are injected so workflows stay testable with fakes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::error::PlatformError;

#[async_trait]
pub trait FilePersistence: Send + Sync {
    /// Store `data` under `filename`, returning a description of where it went
    async fn save(&self, data: &[u8], filename: &str) -> Result<String, PlatformError>;
}

#[async_trait]
pub trait ExternalNavigation: Send + Sync {
    /// Open `url` in a separate browsing context
    async fn open_in_new_context(&self, url: &str) -> Result<(), PlatformError>;
}

/// Saves artifacts into a fixed directory
#[derive(Debug, Clone)]
pub struct DownloadDirectory {
    dir: PathBuf,
}

impl DownloadDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FilePersistence for DownloadDirectory {
    async fn save(&self, data: &[u8], filename: &str) -> Result<String, PlatformError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| PlatformError::Other(format!("Invalid filename: {}", filename)))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, data).await?;

        info!("Saved {} bytes to {}", data.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Opens links with the desktop's URL handler
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    opener: PathBuf,
}

const OPENERS: &[&str] = &["xdg-open", "open", "wslview"];

impl SystemBrowser {
    /// Locate the first available opener on `PATH`
    pub fn detect() -> Result<Self, PlatformError> {
        OPENERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|opener| Self { opener })
            .ok_or_else(|| PlatformError::NoOpener(OPENERS.join(", ")))
    }

    pub fn with_opener(opener: impl Into<PathBuf>) -> Self {
        Self {
            opener: opener.into(),
        }
    }
}

#[async_trait]
impl ExternalNavigation for SystemBrowser {
    async fn open_in_new_context(&self, url: &str) -> Result<(), PlatformError> {
        debug!("Opening {} with {}", url, self.opener.display());
        tokio::process::Command::new(&self.opener)
            .arg(url)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// Prints links instead of opening them (headless sessions)
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintLink;

#[async_trait]
impl ExternalNavigation for PrintLink {
    async fn open_in_new_context(&self, url: &str) -> Result<(), PlatformError> {
        println!("{}", url);
        Ok(())
    }
}
