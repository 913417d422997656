//! Local photo store — moves a transient camera capture to durable storage.
//!
//! The camera writes captures to a scratch location that the OS may reclaim.
//! `PhotoStore::store` relocates the file under the app's photo directory,
//! under a caller-supplied display name or a timestamped default. Collisions
//! on the same name overwrite silently; callers wanting uniqueness must
//! supply unique names.

use std::path::{Path, PathBuf};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Opaque handle to a transient capture at its source location.
///
/// Consumed exactly once by [`PhotoStore::store`] — the source file is gone
/// after a successful move, so the handle is not `Clone`.
#[derive(Debug)]
pub struct CapturedImage {
    source: PathBuf,
}

impl CapturedImage {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// A durably stored photo: final path plus the display name it was saved under.
/// Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    path: PathBuf,
    display_name: String,
}

impl StoredPhoto {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Errors from local photo persistence.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Could not create photo directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Captured image no longer exists at {0}")]
    SourceMissing(PathBuf),

    #[error("Could not move captured image to {path}: {source}")]
    Move {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ═══════════════════════════════════════════════════════════
// PhotoStore
// ═══════════════════════════════════════════════════════════

/// Durable photo storage rooted at a single directory.
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the app's default photo directory (~/ArchiField/photos).
    pub fn default_location() -> Self {
        Self::new(crate::config::photos_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Move a transient capture into durable storage.
    ///
    /// Creates the root directory if needed (idempotent), then moves the
    /// source file to `<root>/<name>.<ext>`. The extension is taken from the
    /// source (fallback `jpg`); the name defaults to `photo_YYYYMMDD_HHMMSS`
    /// when the user supplied none. An existing file under the same name is
    /// overwritten.
    ///
    /// On failure the transient capture is left at its source where possible
    /// (the copy fallback removes the source only after the copy succeeded).
    pub fn store(
        &self,
        capture: CapturedImage,
        display_name: Option<&str>,
    ) -> Result<StoredPhoto, StorageError> {
        if !capture.source.exists() {
            return Err(StorageError::SourceMissing(capture.source));
        }

        std::fs::create_dir_all(&self.root).map_err(|source| StorageError::DirectoryCreate {
            path: self.root.clone(),
            source,
        })?;

        let name = match display_name {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => default_photo_name(),
        };
        let extension = capture
            .source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let target = self.root.join(format!("{name}.{extension}"));

        move_file(&capture.source, &target).map_err(|source| StorageError::Move {
            path: target.clone(),
            source,
        })?;

        tracing::debug!(
            name = %name,
            target = %target.display(),
            "Capture stored durably"
        );

        Ok(StoredPhoto {
            path: target,
            display_name: name,
        })
    }
}

/// Timestamped fallback name for unnamed captures.
fn default_photo_name() -> String {
    format!("photo_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Rename, falling back to copy+remove when source and target sit on
/// different mount points (EXDEV) — common between camera scratch storage
/// and app storage on mobile devices.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)?;
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
