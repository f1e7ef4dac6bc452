//! End-to-end install pipeline
//!
//! Scaffolds the destination, resolves the manifest, fulfills the artifacts
//! and merges the overlay, strictly in that order and one item at a time.
//! Per-item failures are collected in the report; only scaffolding and the
//! overlay merge can fail the run.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::app::client::CatalogClient;
use crate::app::engine::{DownloadEngine, FulfillmentReport};
use crate::app::events::{Phase, PipelineEvent, ProgressReporter};
use crate::app::models::ModpackManifest;
use crate::app::overlay::{MergeSummary, OverlayMerger};
use crate::app::resolver::{ManifestResolver, Resolution};
use crate::app::retry::RetryPolicy;
use crate::constants::files;
use crate::errors::Result;

pub mod signals;

/// Retry settings for the two per-item phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub resolver_retry: RetryPolicy,
    pub download_retry: RetryPolicy,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Entries in the manifest
    pub manifest_entries: usize,
    pub resolution: Resolution,
    pub fulfillment: FulfillmentReport,
    pub merge: MergeSummary,
    pub duration: Duration,
}

impl PipelineReport {
    /// Whether every manifest entry ended up valid on disk
    pub fn is_complete(&self) -> bool {
        self.resolution.failures.is_empty() && self.fulfillment.is_complete()
    }
}

/// Orchestrates one install run
pub struct Pipeline<'a> {
    client: &'a CatalogClient,
    config: PipelineConfig,
    reporter: ProgressReporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a CatalogClient, config: PipelineConfig, reporter: ProgressReporter) -> Self {
        Self {
            client,
            config,
            reporter,
        }
    }

    /// Installs `manifest` into `destination`, merging `overlay` last
    ///
    /// # Errors
    ///
    /// Returns `AppError` only when the destination cannot be scaffolded or
    /// the overlay merge fails
    pub async fn run(
        &self,
        manifest: &ModpackManifest,
        overlay: &Path,
        destination: &Path,
    ) -> Result<PipelineReport> {
        let started = Instant::now();

        scaffold_destination(destination).await?;

        self.reporter.emit(PipelineEvent::PhaseStarted {
            phase: Phase::Resolving,
            total: manifest.files.len(),
        });
        let resolution = ManifestResolver::new(
            self.client,
            self.config.resolver_retry,
            self.reporter.clone(),
        )
        .resolve(&manifest.files)
        .await;

        self.reporter.emit(PipelineEvent::PhaseStarted {
            phase: Phase::Downloading,
            total: resolution.artifacts.len(),
        });
        let fulfillment = DownloadEngine::new(
            self.client,
            self.config.download_retry,
            self.reporter.clone(),
        )
        .fulfill(&resolution.artifacts, destination)
        .await;

        self.reporter.emit(PipelineEvent::PhaseStarted {
            phase: Phase::Merging,
            total: 1,
        });
        let merge = OverlayMerger::merge(overlay, destination).await?;
        self.reporter.emit(PipelineEvent::OverlayMerged {
            files_copied: merge.files_copied,
        });

        let report = PipelineReport {
            manifest_entries: manifest.files.len(),
            resolution,
            fulfillment,
            merge,
            duration: started.elapsed(),
        };
        info!(
            "Pipeline finished in {:?}: {} resolved, {} downloaded, {} valid",
            report.duration,
            report.resolution.artifacts.len(),
            report.fulfillment.downloaded,
            report.fulfillment.skipped
        );
        Ok(report)
    }
}

/// Creates the standard modpack directories under `destination`
pub async fn scaffold_destination(destination: &Path) -> Result<()> {
    for dir in files::SCAFFOLD_DIRS {
        let path = destination.join(dir);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Folder {} exists", dir);
        } else {
            tokio::fs::create_dir_all(&path).await?;
            debug!("Created folder {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scaffold_destination() {
        let dest = tempdir().unwrap();
        std::fs::create_dir(dest.path().join("config")).unwrap();
        std::fs::write(dest.path().join("config/keep.cfg"), "x").unwrap();

        scaffold_destination(dest.path()).await.unwrap();
        scaffold_destination(dest.path()).await.unwrap();

        for dir in files::SCAFFOLD_DIRS {
            assert!(dest.path().join(dir).is_dir());
        }
        assert!(dest.path().join("config/keep.cfg").is_file());
    }
}
