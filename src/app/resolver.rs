//! Manifest resolution against the catalog
//!
//! Entries are looked up strictly one at a time in manifest order. A failed
//! lookup drops that entry from the result and the run carries on, so the
//! output is an order-preserving subsequence of the input.

use tracing::{debug, info, warn};

use crate::app::client::CatalogClient;
use crate::app::events::{PipelineEvent, ProgressReporter};
use crate::app::models::{ArtifactDescriptor, ManifestEntry};
use crate::app::retry::RetryPolicy;
use crate::errors::CatalogResult;

/// Outcome of resolving a manifest
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved artifacts in manifest order
    pub artifacts: Vec<ArtifactDescriptor>,
    /// Entries whose lookup failed, with the reason
    pub failures: Vec<(ManifestEntry, String)>,
    /// Artifacts whose URL was derived rather than supplied
    pub fallback_urls: usize,
}

/// Converts manifest entries into artifact descriptors
pub struct ManifestResolver<'a> {
    client: &'a CatalogClient,
    retry: RetryPolicy,
    reporter: ProgressReporter,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(client: &'a CatalogClient, retry: RetryPolicy, reporter: ProgressReporter) -> Self {
        Self {
            client,
            retry,
            reporter,
        }
    }

    /// Resolves every entry, in order, one request at a time
    pub async fn resolve(&self, entries: &[ManifestEntry]) -> Resolution {
        let total = entries.len();
        let mut resolution = Resolution::default();

        info!("Resolving {} manifest entries", total);

        for (position, entry) in entries.iter().enumerate() {
            let index = position + 1;

            match self.resolve_entry(entry).await {
                Ok((artifact, derived)) => {
                    if derived {
                        resolution.fallback_urls += 1;
                    }
                    self.reporter.emit(PipelineEvent::Resolved {
                        index,
                        total,
                        file_name: artifact.file_name.clone(),
                        size_bytes: artifact.size_bytes,
                    });
                    resolution.artifacts.push(artifact);
                }
                Err(e) => {
                    warn!(
                        "Lookup failed for project {} file {}: {}",
                        entry.project_id, entry.file_id, e
                    );
                    self.reporter.emit(PipelineEvent::LookupFailed {
                        index,
                        total,
                        project_id: entry.project_id,
                        file_id: entry.file_id,
                        error: e.to_string(),
                    });
                    resolution.failures.push((*entry, e.to_string()));
                }
            }
        }

        info!(
            "Resolved {}/{} entries ({} via derived CDN URL)",
            resolution.artifacts.len(),
            total,
            resolution.fallback_urls
        );
        resolution
    }

    /// Looks up one entry; the flag reports whether the URL was derived
    async fn resolve_entry(&self, entry: &ManifestEntry) -> CatalogResult<(ArtifactDescriptor, bool)> {
        let label = format!("Lookup of {}/{}", entry.project_id, entry.file_id);
        let metadata = self
            .retry
            .run(&label, || {
                self.client
                    .fetch_file_metadata(entry.project_id, entry.file_id)
            })
            .await?;

        let (url, derived) = match metadata.direct_url() {
            Some(url) => (url.to_string(), false),
            None => {
                let url = self.client.fallback_url(entry.file_id, &metadata.file_name);
                debug!(
                    "No direct URL for {}, using derived {}",
                    metadata.file_name, url
                );
                (url, true)
            }
        };

        Ok((ArtifactDescriptor::from_metadata(metadata, url), derived))
    }
}
