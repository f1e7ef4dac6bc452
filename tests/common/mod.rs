//! Shared fixtures for the integration tests

#![allow(dead_code)]

use cmpdl::app::{
    ArtifactDescriptor, CatalogClient, ClientConfig, FileHash, HashAlgorithm, Md5Hash,
    ModpackManifest,
};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;

/// Client pointed at a mock server for both the catalog and the CDN
pub fn client_for(server: &MockServer) -> CatalogClient {
    let config = ClientConfig {
        base_url: server.base_url(),
        cdn_base_url: server.url("/cdn"),
        ..ClientConfig::default()
    };
    CatalogClient::with_config(config, "test-key").unwrap()
}

pub fn md5_hex(body: &[u8]) -> String {
    Md5Hash::compute(body).to_hex()
}

/// Catalog-style hash list: SHA-1 first, MD5 second
pub fn catalog_hashes(body: &[u8]) -> Vec<FileHash> {
    vec![
        FileHash {
            algorithm: HashAlgorithm::Sha1,
            value: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
        },
        FileHash {
            algorithm: HashAlgorithm::Md5,
            value: md5_hex(body),
        },
    ]
}

pub fn artifact(server: &MockServer, file_name: &str, body: &[u8]) -> ArtifactDescriptor {
    ArtifactDescriptor {
        file_name: file_name.to_string(),
        owner_id: 1,
        download_url: server.url(format!("/files/{}", file_name)),
        size_bytes: body.len() as u64,
        display_name: file_name.to_string(),
        hashes: catalog_hashes(body),
    }
}

/// Mocks the catalog record for one entry, linking to `/files/<name>`
pub async fn mock_metadata<'a>(
    server: &'a MockServer,
    project_id: u64,
    file_id: u64,
    file_name: &str,
    body: &[u8],
) -> Mock<'a> {
    let record = json!({
        "data": {
            "id": file_id,
            "modId": project_id,
            "displayName": file_name,
            "fileName": file_name,
            "fileLength": body.len(),
            "downloadUrl": server.url(format!("/files/{}", file_name)),
            "hashes": [
                { "value": "da39a3ee5e6b4b0d3255bfef95601890afd80709", "algo": 1 },
                { "value": md5_hex(body), "algo": 2 }
            ]
        }
    });
    let path = format!("/v1/mods/{}/files/{}/", project_id, file_id);
    server
        .mock_async(|when, then| {
            when.method(GET).path(path).header("x-api-key", "test-key");
            then.status(200).json_body(record);
        })
        .await
}

/// Mocks a CDN file body at `/files/<name>`
pub async fn mock_download<'a>(server: &'a MockServer, file_name: &str, body: &[u8]) -> Mock<'a> {
    let path = format!("/files/{}", file_name);
    let body = body.to_vec();
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200).body(body);
        })
        .await
}

pub fn manifest(entries: &[(u64, u64)]) -> ModpackManifest {
    let files: Vec<_> = entries
        .iter()
        .map(|(project, file)| json!({ "projectID": project, "fileID": file, "required": true }))
        .collect();
    serde_json::from_value(json!({
        "minecraft": {
            "version": "1.12.2",
            "modLoaders": [{ "id": "forge-14.23.5.2860", "primary": true }]
        },
        "manifestType": "minecraftModpack",
        "name": "Test Pack",
        "version": "1.0.0",
        "author": "tester",
        "files": files,
        "overrides": "overrides"
    }))
    .unwrap()
}
