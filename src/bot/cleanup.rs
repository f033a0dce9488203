//! Request-scoped temporary files and their delayed removal.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Temporary files of one interaction, keyed by a millisecond timestamp.
#[derive(Debug, Clone)]
pub struct RequestFiles {
    pub download: PathBuf,
    pub processed: PathBuf,
    /// Only written when the reply is too long to send inline
    pub result: PathBuf,
}

impl RequestFiles {
    pub fn new(temp_dir: &Path, stamp_ms: i64) -> Self {
        Self {
            download: temp_dir.join(format!("discord_{}.png", stamp_ms)),
            processed: temp_dir.join(format!("discord_{}_processed.png", stamp_ms)),
            result: temp_dir.join(format!("ocr_result_{}.txt", stamp_ms)),
        }
    }

    pub fn all(&self) -> Vec<PathBuf> {
        vec![
            self.download.clone(),
            self.processed.clone(),
            self.result.clone(),
        ]
    }
}

/// Removes `paths` after `delay` on a background task. Missing files are
/// ignored, other errors are logged.
pub fn schedule_cleanup(paths: Vec<PathBuf>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        remove_files(&paths).await;
    })
}

pub async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Error cleaning up {}: {}", path.display(), e),
        }
    }
}
