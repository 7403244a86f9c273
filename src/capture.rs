//! External image capture
//!
//! Runs the capture executable with a destination path and hands the
//! resulting file to the caller, who owns (and must remove) it.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors that can occur while capturing an image
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture executable could not be started
    #[error("failed to run capture executable: {0}")]
    Spawn(#[from] io::Error),
    /// The capture executable exited unsuccessfully
    #[error("capture exited with status {code:?}: {stderr}")]
    Failed {
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
        /// Captured standard error output
        stderr: String,
    },
    /// The capture executable succeeded but wrote nothing
    #[error("capture produced no file at {0}")]
    MissingOutput(PathBuf),
}

/// A freshly captured image on local storage.
///
/// Lives for a single dispatch: sent, then removed. Dropping the handle
/// without calling [`CapturedImage::remove`] (e.g. a cancelled dispatch)
/// deletes the file as well.
#[derive(Debug)]
pub struct CapturedImage {
    path: PathBuf,
    removed: bool,
}

impl CapturedImage {
    /// Wrap an existing image file
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    /// Location of the image file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the image file, consuming the handle.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file could not be removed.
    pub async fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        tokio::fs::remove_file(&self.path).await
    }
}

impl Drop for CapturedImage {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed abandoned capture"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove abandoned capture"),
        }
    }
}

/// Interface for image capture devices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageCapture: Send + Sync {
    /// Capture a single image.
    ///
    /// On success the file exists and belongs to the caller.
    async fn capture(&self) -> Result<CapturedImage, CaptureError>;
}

/// Capture through an external executable (`imagesnap` by default).
#[derive(Debug, Clone)]
pub struct ExternalCapture {
    program: PathBuf,
    args: Vec<String>,
    temp_dir: PathBuf,
}

impl ExternalCapture {
    /// Create a capture invoker.
    ///
    /// `args` are passed before the destination path, which is always last.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            temp_dir: temp_dir.into(),
        }
    }

    /// Destination for the next capture
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        self.temp_dir.join(format!("captured_{stamp}.jpg"))
    }
}

#[async_trait]
impl ImageCapture for ExternalCapture {
    async fn capture(&self) -> Result<CapturedImage, CaptureError> {
        let destination = self.destination();
        debug!(
            program = %self.program.display(),
            destination = %destination.display(),
            "Running capture"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&destination)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            discard_partial(&destination).await;
            return Err(CaptureError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            return Err(CaptureError::MissingOutput(destination));
        }

        Ok(CapturedImage::new(destination))
    }
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial capture"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial capture"),
    }
}
