//! Data models for cmpdl
//!
//! This module defines the modpack manifest as shipped inside a pack archive,
//! the catalog's file metadata records, and the artifact descriptors the
//! resolver hands to the download engine.

use serde::{Deserialize, Serialize};

use crate::app::hash::Md5Hash;
use crate::constants::files;

/// Top-level `manifest.json` of a modpack archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModpackManifest {
    /// Game version and loader information
    pub minecraft: MinecraftInfo,
    /// Pack author
    #[serde(default)]
    pub author: String,
    /// Pack name
    #[serde(default)]
    pub name: String,
    /// Pack version
    #[serde(default)]
    pub version: String,
    /// One entry per mod, in install order
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
    /// Overlay directory name inside the archive
    #[serde(default = "default_overrides")]
    pub overrides: String,
}

fn default_overrides() -> String {
    files::DEFAULT_OVERRIDES_DIR.to_string()
}

impl ModpackManifest {
    /// The loader flagged as primary, if any
    pub fn primary_loader(&self) -> Option<&ModLoader> {
        self.minecraft.mod_loaders.iter().find(|loader| loader.primary)
    }
}

/// Minecraft section of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftInfo {
    /// Game version, e.g. "1.12.2"
    pub version: String,
    /// Mod loaders required by the pack
    #[serde(default)]
    pub mod_loaders: Vec<ModLoader>,
}

/// Mod loader entry, e.g. `forge-14.23.5.2860`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

/// One mod reference in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
}

impl ManifestEntry {
    pub fn new(project_id: u64, file_id: u64) -> Self {
        Self {
            project_id,
            file_id,
        }
    }
}

/// Hash algorithm identifiers used by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum HashAlgorithm {
    Sha1,
    Md5,
    Unknown(u32),
}

impl From<u32> for HashAlgorithm {
    fn from(id: u32) -> Self {
        match id {
            1 => HashAlgorithm::Sha1,
            2 => HashAlgorithm::Md5,
            other => HashAlgorithm::Unknown(other),
        }
    }
}

impl From<HashAlgorithm> for u32 {
    fn from(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => 1,
            HashAlgorithm::Md5 => 2,
            HashAlgorithm::Unknown(other) => other,
        }
    }
}

/// A content hash as published by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    #[serde(rename = "algo")]
    pub algorithm: HashAlgorithm,
    pub value: String,
}

/// Envelope wrapping every catalog response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse<T> {
    pub data: T,
}

/// File record returned by `GET /v1/mods/{projectId}/files/{fileId}/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub display_name: String,
    pub file_name: String,
    pub file_length: u64,
    /// Absent or null for files the catalog will not link directly
    #[serde(default)]
    pub download_url: Option<String>,
    pub mod_id: u64,
    #[serde(default)]
    pub hashes: Vec<FileHash>,
}

impl FileMetadata {
    /// The direct download URL when the catalog supplied a usable one
    pub fn direct_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// A fully resolved, downloadable mod file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub file_name: String,
    pub owner_id: u64,
    pub download_url: String,
    pub size_bytes: u64,
    pub display_name: String,
    pub hashes: Vec<FileHash>,
}

impl ArtifactDescriptor {
    /// Build a descriptor from catalog metadata and the URL chosen for it
    pub fn from_metadata(metadata: FileMetadata, download_url: String) -> Self {
        Self {
            file_name: metadata.file_name,
            owner_id: metadata.mod_id,
            download_url,
            size_bytes: metadata.file_length,
            display_name: metadata.display_name,
            hashes: metadata.hashes,
        }
    }

    /// The published MD5 digest, looked up by algorithm tag
    ///
    /// Returns `None` when no MD5 entry exists or its value is not valid hex,
    /// in which case the file cannot be verified.
    pub fn md5(&self) -> Option<Md5Hash> {
        self.hashes
            .iter()
            .find(|hash| hash.algorithm == HashAlgorithm::Md5)
            .and_then(|hash| Md5Hash::from_hex(hash.value.trim()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_JSON: &str = r#"{
        "minecraft": {
            "version": "1.12.2",
            "modLoaders": [
                { "id": "forge-14.23.5.2860", "primary": true },
                { "id": "optifine", "primary": false }
            ]
        },
        "manifestType": "minecraftModpack",
        "manifestVersion": 1,
        "name": "Test Pack",
        "version": "1.0.4",
        "author": "someone",
        "files": [
            { "projectID": 238222, "fileID": 3599090, "required": true },
            { "projectID": 32274, "fileID": 2835314, "required": true }
        ],
        "overrides": "overrides"
    }"#;

    #[test]
    fn test_manifest_parsing() {
        let manifest: ModpackManifest = serde_json::from_str(MANIFEST_JSON).unwrap();

        assert_eq!(manifest.minecraft.version, "1.12.2");
        assert_eq!(manifest.name, "Test Pack");
        assert_eq!(
            manifest.files,
            vec![
                ManifestEntry::new(238222, 3599090),
                ManifestEntry::new(32274, 2835314)
            ]
        );
        assert_eq!(
            manifest.primary_loader().map(|l| l.id.as_str()),
            Some("forge-14.23.5.2860")
        );
    }

    #[test]
    fn test_overrides_defaults_when_absent() {
        let manifest: ModpackManifest =
            serde_json::from_str(r#"{"minecraft":{"version":"1.20.1"}}"#).unwrap();
        assert_eq!(manifest.overrides, "overrides");
        assert!(manifest.files.is_empty());
        assert!(manifest.primary_loader().is_none());
    }

    #[test]
    fn test_file_metadata_with_null_url() {
        let json = r#"{
            "id": 3599090,
            "displayName": "JEI 1.12.2",
            "fileName": "jei_1.12.2-4.16.1.301.jar",
            "fileLength": 1048576,
            "downloadUrl": null,
            "modId": 238222,
            "hashes": [
                { "value": "da39a3ee5e6b4b0d3255bfef95601890afd80709", "algo": 1 },
                { "value": "D41D8CD98F00B204E9800998ECF8427E", "algo": 2 }
            ]
        }"#;

        let metadata: FileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.direct_url(), None);
        assert_eq!(metadata.hashes[0].algorithm, HashAlgorithm::Sha1);
        assert_eq!(metadata.hashes[1].algorithm, HashAlgorithm::Md5);

        let descriptor = ArtifactDescriptor::from_metadata(metadata, "u".to_string());
        assert_eq!(descriptor.owner_id, 238222);
        assert_eq!(descriptor.size_bytes, 1_048_576);
        assert_eq!(
            descriptor.md5().map(|h| h.to_hex()),
            Some("d41d8cd98f00b204e9800998ecf8427e".to_string())
        );
    }

    #[test]
    fn test_empty_download_url_counts_as_absent() {
        let metadata = FileMetadata {
            display_name: "x".to_string(),
            file_name: "x.jar".to_string(),
            file_length: 1,
            download_url: Some("  ".to_string()),
            mod_id: 1,
            hashes: Vec::new(),
        };
        assert_eq!(metadata.direct_url(), None);
    }

    #[test]
    fn test_md5_lookup_ignores_position() {
        let descriptor = ArtifactDescriptor {
            file_name: "a.jar".to_string(),
            owner_id: 1,
            download_url: "https://example.com/a.jar".to_string(),
            size_bytes: 10,
            display_name: "A".to_string(),
            hashes: vec![
                FileHash {
                    algorithm: HashAlgorithm::Md5,
                    value: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
                },
                FileHash {
                    algorithm: HashAlgorithm::Unknown(7),
                    value: "zz".to_string(),
                },
            ],
        };
        assert!(descriptor.md5().is_some());

        let sha_only = ArtifactDescriptor {
            hashes: vec![FileHash {
                algorithm: HashAlgorithm::Sha1,
                value: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
            }],
            ..descriptor
        };
        assert!(sha_only.md5().is_none());
    }

    #[test]
    fn test_hash_algorithm_round_trip_ids() {
        assert_eq!(u32::from(HashAlgorithm::from(2)), 2);
        assert_eq!(HashAlgorithm::from(9), HashAlgorithm::Unknown(9));
    }
}
