use anyhow::Context;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::Result;

/// Base name of the rendered mashup inside a run directory
pub const OUTPUT_FILE_NAME: &str = "mashup.wav";

/// Base name of the archive inside a run directory
pub const ARCHIVE_FILE_NAME: &str = "mashup.zip";

/// The isolated working directory of one run.
///
/// Every run gets its own unique subdirectory under the configured work
/// root, so artifacts from two runs can never coexist and a retried run
/// always starts from a clean slate. Layout:
///
/// ```text
/// {work_root}/run_{timestamp}_{id}/
///   downloads/      downloaded assets
///   mashup.wav      rendered composite
///   mashup.zip      archive handed to the deliverer
/// ```
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a fresh run directory (and its downloads subdirectory) under
    /// `work_root`.
    pub fn create(work_root: &Path) -> Result<Self> {
        let run_name = format!(
            "run_{}_{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().to_string()[..8]
        );
        let root = work_root.join(run_name);

        fs_err::create_dir_all(root.join("downloads"))
            .context("Failed to create working directory")?;

        tracing::debug!("Created workspace: {}", root.display());

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the acquirer downloads into
    pub fn download_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Path of the rendered mashup audio
    pub fn output_path(&self) -> PathBuf {
        self.root.join(OUTPUT_FILE_NAME)
    }

    /// Path of the archive handed to the deliverer
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }

    /// Remove the run directory and everything in it. Idempotent: a missing
    /// directory is not an error, so this can run on every terminal path
    /// and be invoked again safely.
    pub fn clean(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => {
                tracing::debug!("Removed workspace: {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove working directory: {}", self.root.display())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_clean() {
        let base = tempfile::tempdir().unwrap();
        let ws = Workspace::create(base.path()).unwrap();

        assert!(ws.root().exists());
        assert!(ws.download_dir().exists());

        ws.clean().unwrap();
        assert!(!ws.root().exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let ws = Workspace::create(base.path()).unwrap();

        ws.clean().unwrap();
        ws.clean().unwrap();
        assert!(!ws.root().exists());
    }

    #[test]
    fn test_runs_are_isolated() {
        let base = tempfile::tempdir().unwrap();
        let a = Workspace::create(base.path()).unwrap();
        let b = Workspace::create(base.path()).unwrap();

        assert_ne!(a.root(), b.root());

        a.clean().unwrap();
        assert!(b.root().exists());
        b.clean().unwrap();
    }

    #[test]
    fn test_clean_removes_artifacts() {
        let base = tempfile::tempdir().unwrap();
        let ws = Workspace::create(base.path()).unwrap();

        fs_err::write(ws.download_dir().join("song.m4a"), b"x").unwrap();
        fs_err::write(ws.output_path(), b"x").unwrap();
        fs_err::write(ws.archive_path(), b"x").unwrap();

        ws.clean().unwrap();
        assert!(!ws.root().exists());
    }
}
