//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by catalog lookups and CDN downloads.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{catalog, http};
use crate::errors::{CatalogError, CatalogResult};

/// Configuration for the catalog and download HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Catalog REST API base URL
    pub base_url: String,
    /// CDN base URL used for derived download URLs
    pub cdn_base_url: String,
    /// Timeout for a single catalog request
    pub request_timeout: Duration,
    /// Connect timeout for every request
    pub connect_timeout: Duration,
    /// Overall timeout for one file download (None = unbounded)
    pub download_timeout: Option<Duration>,
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: catalog::BASE_URL.to_string(),
            cdn_base_url: catalog::CDN_BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            download_timeout: None,
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    ///
    /// Response decompression is enabled for gzip, brotli and deflate, which
    /// also makes reqwest advertise them in `Accept-Encoding`.
    pub fn build_http_client(&self) -> CatalogResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        client_builder.build().map_err(CatalogError::Http)
    }
}
