//! HTTP client for the CurseForge catalog and CDN
//!
//! This module provides a typed request/response layer over the catalog API
//! together with the CDN download path.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Catalog and browser-style requests
//! - `download`: Streaming file downloads with atomic writes

use std::path::Path;

use url::Url;

use crate::app::models::{CatalogResponse, FileMetadata};
use crate::constants::catalog;
use crate::errors::{CatalogError, CatalogResult, DownloadResult};

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// Client for the CurseForge catalog
///
/// Performs no retry and no rate limiting; each call is exactly one request.
#[derive(Debug)]
pub struct CatalogClient {
    http_handler: HttpHandler,
    base_url: Url,
    cdn_base_url: String,
    download_timeout: Option<std::time::Duration>,
}

impl CatalogClient {
    /// Creates a client against the public catalog with default settings
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> CatalogResult<Self> {
        Self::with_config(ClientConfig::default(), api_key)
    }

    /// Creates a client with custom configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration settings
    /// * `api_key` - Catalog credential
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the base URL is invalid or the HTTP client
    /// cannot be built
    pub fn with_config(config: ClientConfig, api_key: impl Into<String>) -> CatalogResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, api_key, config.request_timeout);

        tracing::debug!("Created catalog client for {}", base_url);

        Ok(Self {
            http_handler,
            base_url,
            cdn_base_url: config.cdn_base_url,
            download_timeout: config.download_timeout,
        })
    }

    /// Fetches the metadata record of one project file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if:
    /// - The request fails at the transport level
    /// - The key is rejected (401/403)
    /// - The file does not exist (404)
    /// - Any other non-2xx status is returned
    /// - The body does not decode
    pub async fn fetch_file_metadata(
        &self,
        project_id: u64,
        file_id: u64,
    ) -> CatalogResult<FileMetadata> {
        let url = self.endpoint(&format!("v1/mods/{}/files/{}/", project_id, file_id))?;
        let response = self.http_handler.get_catalog(&url).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                project_id,
                file_id,
            });
        }

        let envelope: CatalogResponse<FileMetadata> = HttpHandler::decode_json(response).await?;
        Ok(envelope.data)
    }

    /// Confirms the configured key is accepted by the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unauthorized` if the key is rejected
    pub async fn verify_api_key(&self) -> CatalogResult<()> {
        let url = self.endpoint(&format!("v1/games/{}", catalog::MINECRAFT_GAME_ID))?;
        let response = self.http_handler.get_catalog(&url).await?;
        let _: serde_json::Value = HttpHandler::decode_json(response).await?;
        Ok(())
    }

    /// CDN URL for a file record the catalog did not link directly
    pub fn fallback_url(&self, file_id: u64, file_name: &str) -> String {
        fallback_download_url(&self.cdn_base_url, file_id, file_name)
    }

    /// Streams a download URL into `destination`, returning bytes written
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the transfer fails for any reason
    pub async fn download_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        DownloadHandler::new(&self.http_handler, self.download_timeout)
            .download_file(url, destination)
            .await
    }

    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                error: e.to_string(),
            })
    }
}

/// Derives the CDN location of a file from its numeric id
///
/// The decimal id is split into its first four digits and the remainder,
/// giving `{cdn}/files/{first4}/{rest}/{file_name}`. Ids of four digits or
/// fewer yield an empty second segment.
///
/// ```rust
/// use cmpdl::app::client::fallback_download_url;
///
/// assert_eq!(
///     fallback_download_url("https://edge.forgecdn.net", 123456, "x.jar"),
///     "https://edge.forgecdn.net/files/1234/56/x.jar"
/// );
/// ```
pub fn fallback_download_url(cdn_base: &str, file_id: u64, file_name: &str) -> String {
    let digits = file_id.to_string();
    let (first, rest) = digits.split_at(digits.len().min(catalog::CDN_SPLIT_DIGITS));
    format!(
        "{}/files/{}/{}/{}",
        cdn_base.trim_end_matches('/'),
        first,
        rest,
        file_name
    )
}

/// Parses a base URL so relative endpoint joins keep its full path
fn parse_base_url(raw: &str) -> CatalogResult<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| CatalogError::InvalidUrl {
        url: raw.to_string(),
        error: e.to_string(),
    })
}
