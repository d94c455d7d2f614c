//! Spool directory layout and outcome-driven file relocation.
//!
//! The four working directories under a common base are the tool's only
//! persistence: a file sitting in `pending/` is unprocessed, a file in
//! `success/` or `error/` is done. [`Spool::commit`] renames a file into its
//! outcome directory; that rename is the single atomic commit point.

use bytes::Bytes;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{CreateDirSnafu, ListSnafu, ReadSnafu, RelocateSnafu, SpoolError};

/// A file discovered in the pending directory.
///
/// Transient: lives for one poll-cycle iteration only.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Bare file name, used for classification and as the remote name.
    pub name: String,
    /// Absolute path inside the pending directory.
    pub path: PathBuf,
}

/// Terminal directory a processed file is committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Delivered to the remote filesystem.
    Success,
    /// Rejected or failed.
    Error,
}

/// The spool directory layout.
#[derive(Debug, Clone)]
pub struct Spool {
    base: PathBuf,
    pending: PathBuf,
    success: PathBuf,
    error: PathBuf,
    log: PathBuf,
}

impl Spool {
    /// Derive the directory layout from a base path.
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            pending: base.join("pending"),
            success: base.join("success"),
            error: base.join("error"),
            log: base.join("log"),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn pending_dir(&self) -> &Path {
        &self.pending
    }

    pub fn success_dir(&self) -> &Path {
        &self.success
    }

    pub fn error_dir(&self) -> &Path {
        &self.error
    }

    pub fn log_dir(&self) -> &Path {
        &self.log
    }

    /// Create the four working directories if they do not exist yet.
    pub async fn bootstrap(&self) -> Result<(), SpoolError> {
        for dir in [&self.pending, &self.success, &self.error, &self.log] {
            tokio::fs::create_dir_all(dir)
                .await
                .context(CreateDirSnafu { path: dir.clone() })?;
        }
        Ok(())
    }

    /// List the files directly inside the pending directory.
    ///
    /// Non-recursive and files only; sub-directories are left alone. The
    /// result is name-sorted so processing order is deterministic. Entries
    /// that vanish or turn unreadable between listing and inspection are
    /// skipped with a warning.
    pub async fn list_pending(&self) -> Result<Vec<PendingFile>, SpoolError> {
        let mut entries = tokio::fs::read_dir(&self.pending).await.context(ListSnafu {
            path: self.pending.clone(),
        })?;

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await.context(ListSnafu {
                path: self.pending.clone(),
            })? {
                Some(entry) => entry,
                None => break,
            };

            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => files.push(PendingFile {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                }),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                }
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Read a pending file's full contents.
    pub async fn read(&self, file: &PendingFile) -> Result<Bytes, SpoolError> {
        let content = tokio::fs::read(&file.path).await.context(ReadSnafu {
            path: file.path.clone(),
        })?;
        Ok(Bytes::from(content))
    }

    /// Move a file into its outcome directory, replacing any same-named
    /// file already there. Returns the destination path.
    pub async fn commit(
        &self,
        file: &PendingFile,
        disposition: Disposition,
    ) -> Result<PathBuf, SpoolError> {
        let dest_dir = match disposition {
            Disposition::Success => &self.success,
            Disposition::Error => &self.error,
        };
        let dest = dest_dir.join(&file.name);

        tokio::fs::rename(&file.path, &dest)
            .await
            .context(RelocateSnafu {
                from: file.path.clone(),
                to: dest.clone(),
            })?;

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn spool_in(tmp: &TempDir) -> Spool {
        let spool = Spool::new(tmp.path());
        spool.bootstrap().await.unwrap();
        spool
    }

    #[tokio::test]
    async fn test_bootstrap_creates_the_layout() {
        let tmp = TempDir::new().unwrap();
        let spool = spool_in(&tmp).await;

        assert!(spool.pending_dir().is_dir());
        assert!(spool.success_dir().is_dir());
        assert!(spool.error_dir().is_dir());
        assert!(spool.log_dir().is_dir());
    }

    #[tokio::test]
    async fn test_list_pending_is_sorted_and_files_only() {
        let tmp = TempDir::new().unwrap();
        let spool = spool_in(&tmp).await;

        tokio::fs::write(spool.pending_dir().join("b.xml"), "b").await.unwrap();
        tokio::fs::write(spool.pending_dir().join("a.xml"), "a").await.unwrap();
        tokio::fs::create_dir(spool.pending_dir().join("subdir")).await.unwrap();

        let files = spool.list_pending().await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.xml", "b.xml"]);
    }

    #[tokio::test]
    async fn test_commit_moves_to_the_outcome_directory() {
        let tmp = TempDir::new().unwrap();
        let spool = spool_in(&tmp).await;

        tokio::fs::write(spool.pending_dir().join("a.xml"), "a").await.unwrap();
        let files = spool.list_pending().await.unwrap();

        let dest = spool.commit(&files[0], Disposition::Success).await.unwrap();
        assert_eq!(dest, spool.success_dir().join("a.xml"));
        assert!(dest.is_file());
        assert!(!files[0].path.exists());
    }

    #[tokio::test]
    async fn test_commit_overwrites_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let spool = spool_in(&tmp).await;

        tokio::fs::write(spool.error_dir().join("x.xml"), "old").await.unwrap();
        tokio::fs::write(spool.pending_dir().join("x.xml"), "new").await.unwrap();

        let files = spool.list_pending().await.unwrap();
        spool.commit(&files[0], Disposition::Error).await.unwrap();

        let content = tokio::fs::read_to_string(spool.error_dir().join("x.xml"))
            .await
            .unwrap();
        assert_eq!(content, "new");
        assert!(spool.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_of_a_vanished_file_reports_paths() {
        let tmp = TempDir::new().unwrap();
        let spool = spool_in(&tmp).await;

        let ghost = PendingFile {
            name: "ghost.xml".to_string(),
            path: spool.pending_dir().join("ghost.xml"),
        };

        let err = spool.commit(&ghost, Disposition::Error).await.unwrap_err();
        assert!(matches!(err, SpoolError::Relocate { .. }));
        assert!(err.to_string().contains("ghost.xml"));
    }
}
