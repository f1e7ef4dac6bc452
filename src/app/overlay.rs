//! Overlay merge of a pack's static files into the destination
//!
//! Every file under the overlay directory is copied to the same relative path
//! under the destination root, overwriting whatever is there.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{OverlayError, OverlayResult};

/// Counts from one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_copied: usize,
    pub directories_created: usize,
}

/// Copies an overlay tree over a destination tree
pub struct OverlayMerger;

impl OverlayMerger {
    /// Recursively copies `source` into `destination`, overwriting files
    ///
    /// A missing `source` merges nothing.
    ///
    /// # Errors
    ///
    /// Returns `OverlayError` on the first entry that cannot be read, created
    /// or copied
    pub async fn merge(source: &Path, destination: &Path) -> OverlayResult<MergeSummary> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            warn!(
                "No overlay directory at {}, nothing to merge",
                source.display()
            );
            return Ok(MergeSummary::default());
        }

        let source = source.to_path_buf();
        let destination = destination.to_path_buf();

        let summary = tokio::task::spawn_blocking(move || Self::merge_blocking(&source, &destination))
            .await
            .map_err(|e| OverlayError::Aborted {
                reason: e.to_string(),
            })??;

        info!(
            "Overlay merged: {} files, {} new directories",
            summary.files_copied, summary.directories_created
        );
        Ok(summary)
    }

    fn merge_blocking(source: &Path, destination: &Path) -> OverlayResult<MergeSummary> {
        let mut summary = MergeSummary::default();

        for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| OverlayError::Aborted {
                    reason: e.to_string(),
                })?;
            let target: PathBuf = destination.join(relative);

            if entry.file_type().is_dir() {
                if !target.is_dir() {
                    std::fs::create_dir_all(&target).map_err(|source| OverlayError::Copy {
                        path: target.clone(),
                        source,
                    })?;
                    summary.directories_created += 1;
                }
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|source| OverlayError::Copy {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::copy(entry.path(), &target).map_err(|source| OverlayError::Copy {
                path: target.clone(),
                source,
            })?;
            debug!("Copied {}", relative.display());
            summary.files_copied += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_merge_nested_and_overwrite() {
        let overlay = tempdir().unwrap();
        let dest = tempdir().unwrap();

        std::fs::create_dir_all(overlay.path().join("config/jei")).unwrap();
        std::fs::write(overlay.path().join("config/jei/jei.cfg"), "new").unwrap();
        std::fs::write(overlay.path().join("options.txt"), "fov:90").unwrap();

        std::fs::create_dir_all(dest.path().join("config/jei")).unwrap();
        std::fs::write(dest.path().join("config/jei/jei.cfg"), "old").unwrap();
        std::fs::write(dest.path().join("untouched.txt"), "keep").unwrap();

        let summary = OverlayMerger::merge(overlay.path(), dest.path()).await.unwrap();

        assert_eq!(summary.files_copied, 2);
        assert_eq!(summary.directories_created, 0);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("config/jei/jei.cfg")).unwrap(),
            "new"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("options.txt")).unwrap(),
            "fov:90"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("untouched.txt")).unwrap(),
            "keep"
        );
    }

    #[tokio::test]
    async fn test_merge_creates_directories() {
        let overlay = tempdir().unwrap();
        let dest = tempdir().unwrap();
        std::fs::create_dir_all(overlay.path().join("scripts/deep")).unwrap();
        std::fs::write(overlay.path().join("scripts/deep/a.zs"), "recipes").unwrap();

        let summary = OverlayMerger::merge(overlay.path(), dest.path()).await.unwrap();
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.directories_created, 2);
        assert!(dest.path().join("scripts/deep/a.zs").is_file());
    }

    #[tokio::test]
    async fn test_missing_overlay_is_noop() {
        let dest = tempdir().unwrap();
        let summary = OverlayMerger::merge(&dest.path().join("overrides"), dest.path())
            .await
            .unwrap();
        assert_eq!(summary, MergeSummary::default());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unwritable_destination_is_fatal() {
        let overlay = tempdir().unwrap();
        std::fs::write(overlay.path().join("file.txt"), "x").unwrap();

        let dest = tempdir().unwrap();
        // A regular file where a directory is needed
        let blocked = dest.path().join("blocked");
        std::fs::write(&blocked, "not a dir").unwrap();

        let result = OverlayMerger::merge(overlay.path(), &blocked.join("inner")).await;
        assert!(matches!(result, Err(OverlayError::Copy { .. })));
    }
}
