//! Skip-if-valid checks for files already on disk
//!
//! A local file is trusted only when its MD5 digest equals the MD5 the
//! catalog published for the artifact. Anything else (no file, no MD5 entry,
//! a malformed published digest, an unreadable file, a different digest)
//! means the artifact must be downloaded again.

use std::path::Path;

use tracing::{debug, warn};

use crate::app::hash::Md5Hash;
use crate::app::models::ArtifactDescriptor;

/// Result of checking one artifact against the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityVerdict {
    /// Nothing at the destination path
    Missing,
    /// Existing file matches the published digest
    Valid,
    /// Existing file differs from the published digest
    Mismatch { expected: Md5Hash, actual: Md5Hash },
    /// A file exists but there is nothing usable to compare it with
    Unverifiable,
}

impl IntegrityVerdict {
    /// Whether the download can be skipped
    pub fn should_skip(&self) -> bool {
        matches!(self, IntegrityVerdict::Valid)
    }

    /// Whether a file existed at the destination
    pub fn file_existed(&self) -> bool {
        !matches!(self, IntegrityVerdict::Missing)
    }
}

/// Decides whether existing files can stand in for a download
pub struct IntegrityGate;

impl IntegrityGate {
    /// Verdict for in-memory file contents, `None` meaning no file
    pub fn check_bytes(descriptor: &ArtifactDescriptor, existing: Option<&[u8]>) -> IntegrityVerdict {
        let Some(bytes) = existing else {
            return IntegrityVerdict::Missing;
        };
        let Some(expected) = descriptor.md5() else {
            return IntegrityVerdict::Unverifiable;
        };

        let actual = Md5Hash::compute(bytes);
        Self::compare(expected, actual)
    }

    /// Whether the download of `descriptor` can be skipped given `existing`
    pub fn should_skip(descriptor: &ArtifactDescriptor, existing: Option<&[u8]>) -> bool {
        Self::check_bytes(descriptor, existing).should_skip()
    }

    /// Verdict for the file at `path`, hashed in chunks
    pub async fn check_file(descriptor: &ArtifactDescriptor, path: &Path) -> IntegrityVerdict {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return IntegrityVerdict::Unverifiable,
            Err(_) => return IntegrityVerdict::Missing,
        }

        let Some(expected) = descriptor.md5() else {
            debug!("No usable MD5 published for {}", descriptor.file_name);
            return IntegrityVerdict::Unverifiable;
        };

        match Md5Hash::of_file(path).await {
            Ok(actual) => Self::compare(expected, actual),
            Err(e) => {
                warn!("{}", e);
                IntegrityVerdict::Unverifiable
            }
        }
    }

    fn compare(expected: Md5Hash, actual: Md5Hash) -> IntegrityVerdict {
        if expected == actual {
            IntegrityVerdict::Valid
        } else {
            IntegrityVerdict::Mismatch { expected, actual }
        }
    }
}
