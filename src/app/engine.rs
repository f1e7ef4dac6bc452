//! Sequential fulfillment of resolved artifacts
//!
//! Each artifact is checked against the file already at
//! `destination/mods/<fileName>`, then downloaded when that file is missing or
//! stale. A failure is recorded and the engine moves on; nothing here aborts
//! the run.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::client::CatalogClient;
use crate::app::events::{PipelineEvent, ProgressReporter};
use crate::app::integrity::{IntegrityGate, IntegrityVerdict};
use crate::app::models::ArtifactDescriptor;
use crate::app::retry::RetryPolicy;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// A download that was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub file_name: String,
    pub reason: String,
}

/// Tally of one fulfillment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulfillmentReport {
    /// Files written by this pass
    pub downloaded: usize,
    /// Files already valid on disk
    pub skipped: usize,
    /// Existing files that failed verification and were re-fetched
    pub replaced: usize,
    /// Downloads that failed
    pub failed: Vec<FailedDownload>,
    /// Bytes written across all downloads
    pub bytes_written: u64,
}

impl FulfillmentReport {
    /// Number of artifacts the pass looked at
    pub fn processed(&self) -> usize {
        self.downloaded + self.skipped + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloads artifacts one at a time, in order
pub struct DownloadEngine<'a> {
    client: &'a CatalogClient,
    retry: RetryPolicy,
    reporter: ProgressReporter,
}

impl<'a> DownloadEngine<'a> {
    pub fn new(client: &'a CatalogClient, retry: RetryPolicy, reporter: ProgressReporter) -> Self {
        Self {
            client,
            retry,
            reporter,
        }
    }

    /// Fulfills every artifact into `destination/mods`
    pub async fn fulfill(
        &self,
        artifacts: &[ArtifactDescriptor],
        destination: &Path,
    ) -> FulfillmentReport {
        let total = artifacts.len();
        let mods_dir = destination.join(files::MODS_DIR);
        let mut report = FulfillmentReport::default();

        info!("Fulfilling {} artifacts into {}", total, mods_dir.display());

        for (position, artifact) in artifacts.iter().enumerate() {
            let index = position + 1;

            let target = match mod_path(&mods_dir, &artifact.file_name) {
                Ok(target) => target,
                Err(e) => {
                    self.record_failure(&mut report, index, total, artifact, e.to_string());
                    continue;
                }
            };

            let verdict = IntegrityGate::check_file(artifact, &target).await;
            match &verdict {
                IntegrityVerdict::Valid => {
                    debug!("{} is valid, skipping", artifact.file_name);
                    self.reporter.emit(PipelineEvent::ExistingValid {
                        index,
                        total,
                        file_name: artifact.file_name.clone(),
                    });
                    report.skipped += 1;
                    continue;
                }
                IntegrityVerdict::Missing => {}
                IntegrityVerdict::Mismatch { expected, actual } => {
                    debug!(
                        "{} is invalid (expected {}, found {})",
                        artifact.file_name, expected, actual
                    );
                    self.reporter.emit(PipelineEvent::ExistingInvalid {
                        index,
                        total,
                        file_name: artifact.file_name.clone(),
                    });
                }
                IntegrityVerdict::Unverifiable => {
                    self.reporter.emit(PipelineEvent::ExistingInvalid {
                        index,
                        total,
                        file_name: artifact.file_name.clone(),
                    });
                }
            }

            self.reporter.emit(PipelineEvent::Downloading {
                index,
                total,
                file_name: artifact.file_name.clone(),
                size_bytes: artifact.size_bytes,
            });

            match self.download(artifact, &target).await {
                Ok(bytes) => {
                    report.downloaded += 1;
                    report.bytes_written += bytes;
                    if verdict.file_existed() {
                        report.replaced += 1;
                    }
                    self.reporter.emit(PipelineEvent::Downloaded {
                        index,
                        total,
                        file_name: artifact.file_name.clone(),
                        bytes,
                    });
                }
                Err(e) => self.record_failure(&mut report, index, total, artifact, e.to_string()),
            }
        }

        info!(
            "Fulfillment finished: {} downloaded, {} valid, {} failed",
            report.downloaded,
            report.skipped,
            report.failed.len()
        );
        report
    }

    async fn download(&self, artifact: &ArtifactDescriptor, target: &Path) -> DownloadResult<u64> {
        let label = format!("Download of {}", artifact.file_name);
        self.retry
            .run(&label, || {
                self.client.download_file(&artifact.download_url, target)
            })
            .await
    }

    fn record_failure(
        &self,
        report: &mut FulfillmentReport,
        index: usize,
        total: usize,
        artifact: &ArtifactDescriptor,
        reason: String,
    ) {
        warn!("Download of {} failed: {}", artifact.file_name, reason);
        self.reporter.emit(PipelineEvent::DownloadFailed {
            index,
            total,
            file_name: artifact.file_name.clone(),
            error: reason.clone(),
        });
        report.failed.push(FailedDownload {
            file_name: artifact.file_name.clone(),
            reason,
        });
    }
}

/// Destination path for a catalog file name, confined to `mods_dir`
fn mod_path(mods_dir: &Path, file_name: &str) -> DownloadResult<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !file_name.contains(['/', '\\']) => {
            Ok(mods_dir.join(file_name))
        }
        _ => Err(DownloadError::UnsafeFileName {
            file_name: file_name.to_string(),
        }),
    }
}
