//! Scoped ownership of temporary media files.
//!
//! A [`TempMedia`] is a uniquely named file that must not outlive the
//! pipeline invocation that created it. Removal happens explicitly on
//! both the success and failure paths; `Drop` is a best-effort backstop
//! for early returns the explicit paths miss.

use std::path::{Path, PathBuf};

/// A uniquely named temporary file under a caller-chosen directory.
///
/// The file does not exist until [`write`](Self::write) is called.
#[derive(Debug)]
pub struct TempMedia {
    path: PathBuf,
}

impl TempMedia {
    /// Reserve a unique path `<dir>/<uuid>.<ext>`, creating `dir` if needed.
    pub async fn create(dir: &Path, ext: &str) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.{ext}", uuid::Uuid::new_v4()));
        Ok(Self { path })
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full contents of the temporary file.
    pub async fn write(&self, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(&self.path, bytes).await
    }

    /// Remove the file, consuming the guard. Missing files are fine: the
    /// guard may never have been written.
    pub async fn remove(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temp file");
            }
        }
        // Drop must not try again.
        std::mem::forget(self);
    }
}

impl Drop for TempMedia {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
