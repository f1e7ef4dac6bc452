//! Modpack archive loading
//!
//! A modpack is a `.zip` holding `manifest.json` and an overlay directory.
//! The archive is extracted into a temporary directory that lives as long as
//! the returned [`ModpackArchive`] and is removed when it is dropped.

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::app::models::ModpackManifest;
use crate::constants::files;
use crate::errors::{ManifestError, ManifestResult};

impl FromStr for ModpackManifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let manifest: ModpackManifest = serde_json::from_str(s)?;
        check_overrides(&manifest.overrides)?;
        Ok(manifest)
    }
}

/// The overrides entry must be a relative path of plain names
fn check_overrides(value: &str) -> ManifestResult<()> {
    let path = Path::new(value);
    let plain = path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(ManifestError::UnsafeOverrides {
            value: value.to_string(),
        })
    }
}

impl ModpackManifest {
    /// Reads and parses a `manifest.json` file
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::MissingEntry` if the file does not exist, or a
    /// parse error if it is not a valid manifest
    pub async fn from_path(path: &Path) -> ManifestResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::MissingEntry {
                    name: files::MANIFEST_FILE_NAME.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        content.parse()
    }
}

/// An extracted modpack archive
#[derive(Debug)]
pub struct ModpackArchive {
    manifest: ModpackManifest,
    extracted: TempDir,
}

impl ModpackArchive {
    /// Validates, extracts and parses a modpack archive
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if:
    /// - The path does not exist or is not a file
    /// - The extension is not `.zip`
    /// - The archive is corrupt or cannot be extracted
    /// - `manifest.json` is missing or invalid
    pub async fn open(path: &Path) -> ManifestResult<Self> {
        validate_pack_path(path)?;

        let extracted = tempfile::Builder::new().prefix("cmpdl-").tempdir()?;
        let archive_path = path.to_path_buf();
        let target = extracted.path().to_path_buf();

        debug!(
            "Extracting {} to {}",
            archive_path.display(),
            target.display()
        );
        tokio::task::spawn_blocking(move || extract_archive(&archive_path, &target))
            .await
            .map_err(|e| ManifestError::Extraction {
                reason: e.to_string(),
            })??;

        let manifest =
            ModpackManifest::from_path(&extracted.path().join(files::MANIFEST_FILE_NAME)).await?;

        info!(
            "Loaded modpack '{}' {} with {} mods",
            manifest.name,
            manifest.version,
            manifest.files.len()
        );

        Ok(Self {
            manifest,
            extracted,
        })
    }

    pub fn manifest(&self) -> &ModpackManifest {
        &self.manifest
    }

    /// Overlay source directory named by the manifest
    ///
    /// Always inside the extraction directory; unsafe values are rejected at parse time.
    pub fn overrides_dir(&self) -> PathBuf {
        self.extracted.path().join(&self.manifest.overrides)
    }
}

/// Checks the input path before any extraction or network activity
pub fn validate_pack_path(path: &Path) -> ManifestResult<()> {
    if !path.is_file() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(files::PACK_EXTENSION))
        .unwrap_or(false);
    if !is_zip {
        return Err(ManifestError::InvalidExtension {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

fn extract_archive(archive_path: &Path, target: &Path) -> ManifestResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    archive.extract(target)?;
    Ok(())
}
