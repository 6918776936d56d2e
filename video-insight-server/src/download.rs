//! Video acquisition.
//!
//! A `LocalVideo` is the per-request temporary `.mp4` file; a
//! `VideoDownloader` fills it. The production downloader shells out to
//! `yt-dlp`.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use video_insight_common::config::Config;
use video_insight_common::error::Error;

/// Container format requested from the downloader.
pub const VIDEO_FORMAT: &str = "mp4";

/// MIME type of downloaded videos.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Prefix of the temporary files created for downloads.
const TEMP_PREFIX: &str = "video-insight-";

// =============================================================================
// Local Video File
// =============================================================================

/// Uniquely named temporary video file owned by one request.
///
/// The file is deleted by `cleanup` and again on drop. Deleting a file that
/// is already gone is not an error.
#[derive(Debug)]
pub struct LocalVideo {
    path: PathBuf,
}

impl LocalVideo {
    /// Create an empty temp file in the system temp directory.
    pub fn create() -> Result<Self, Error> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Create an empty temp file in `dir`.
    pub fn create_in(dir: &Path) -> Result<Self, Error> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&format!(".{}", VIDEO_FORMAT))
            .tempfile_in(dir)?;

        // Detach from tempfile's own deletion; removal is handled here so it
        // can be idempotent and logged.
        let path = temp.into_temp_path().keep().map_err(|e| Error::Io(e.error))?;

        debug!(path = %path.display(), "Created temporary video file");
        Ok(Self { path })
    }

    /// Path of the temp file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the file. A missing file counts as success.
    pub fn remove(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed temporary video file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort delete that never fails.
    pub fn cleanup(&self) {
        if let Err(e) = self.remove() {
            warn!(path = %self.path.display(), error = %e, "Failed to remove temporary video file");
        }
    }
}

impl Drop for LocalVideo {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// =============================================================================
// Downloader
// =============================================================================

/// Downloads the video behind a URL into a local file.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Write the video at `url` to `output`, replacing any existing content.
    async fn download(&self, url: &str, output: &Path) -> Result<(), Error>;
}

/// `yt-dlp` subprocess downloader.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    /// Create a downloader that runs the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Create a downloader from the `YT_DLP_PATH` setting.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.yt_dlp_path)
    }

    /// Executable this downloader runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for a single download.
    ///
    /// Requests an mp4 container, overwrites the (already created) output
    /// file, and keeps progress output off.
    pub fn args(url: &str, output: &Path) -> Vec<OsString> {
        vec![
            "--format".into(),
            VIDEO_FORMAT.into(),
            "--output".into(),
            output.as_os_str().to_owned(),
            "--force-overwrites".into(),
            "--no-progress".into(),
            "--no-playlist".into(),
            "--quiet".into(),
            "--no-warnings".into(),
            "--".into(),
            url.into(),
        ]
    }

    /// Report the installed yt-dlp version, if the executable runs.
    pub async fn version(&self) -> Result<String, Error> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(Error::download(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        Error::download(format!("Failed to run '{}': {}", self.program.display(), e))
    }
}

#[async_trait]
impl VideoDownloader for YtDlp {
    #[instrument(level = "info", name = "yt_dlp_download", skip(self, output), fields(output = %output.display()))]
    async fn download(&self, url: &str, output: &Path) -> Result<(), Error> {
        let args = Self::args(url, output);
        debug!(program = %self.program.display(), args = ?args, "Running yt-dlp");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::download(format!(
                "yt-dlp exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(Error::download(format!(
                "yt-dlp finished but wrote no video data for {}",
                url
            )));
        }

        info!(bytes = size, "Video downloaded");
        Ok(())
    }
}
