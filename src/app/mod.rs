//! Core install pipeline for Curse modpacks
//!
//! The pipeline turns a modpack manifest into a populated instance directory:
//! catalog lookups resolve each entry to a downloadable artifact, existing files
//! are checked by MD5, stale or missing files are downloaded, and the pack's
//! overlay directory is merged last.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use cmpdl::app::{CatalogClient, ModpackArchive, Pipeline, PipelineConfig, ProgressReporter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new("my-api-key")?;
//! let archive = ModpackArchive::open(Path::new("pack.zip")).await?;
//!
//! let pipeline = Pipeline::new(&client, PipelineConfig::default(), ProgressReporter::disabled());
//! let report = pipeline
//!     .run(archive.manifest(), &archive.overrides_dir(), Path::new("instance"))
//!     .await?;
//! println!("{} downloaded", report.fulfillment.downloaded);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod engine;
pub mod events;
pub mod hash;
pub mod integrity;
pub mod manifest;
pub mod models;
pub mod overlay;
pub mod pipeline;
pub mod resolver;
pub mod retry;

// Re-export main public API
pub use client::{CatalogClient, ClientConfig, fallback_download_url};
pub use engine::{DownloadEngine, FailedDownload, FulfillmentReport};
pub use events::{Phase, PipelineEvent, ProgressReporter};
pub use hash::Md5Hash;
pub use integrity::{IntegrityGate, IntegrityVerdict};
pub use manifest::{ModpackArchive, validate_pack_path};
pub use models::{
    ArtifactDescriptor, FileHash, FileMetadata, HashAlgorithm, ManifestEntry, ModpackManifest,
};
pub use overlay::{MergeSummary, OverlayMerger};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport};
pub use resolver::{ManifestResolver, Resolution};
pub use retry::RetryPolicy;
