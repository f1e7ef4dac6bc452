//! Core HTTP operations for the catalog and the CDN
//!
//! Catalog requests carry the API key and expect JSON. CDN requests look like
//! a browser navigation, since the CDN occasionally rejects anything else.
//! Neither kind retries here; retry policy belongs to the callers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::constants::{auth, http};
use crate::errors::{CatalogError, CatalogResult, DownloadError, DownloadResult};

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    api_key: String,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a built client
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use for requests
    /// * `api_key` - Catalog credential sent as `x-api-key`
    /// * `request_timeout` - Timeout applied to each catalog request
    pub fn new(client: Client, api_key: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            request_timeout,
        }
    }

    /// Issues an authenticated catalog GET
    ///
    /// The response is returned whatever its status so callers can map
    /// status codes to domain errors.
    pub async fn get_catalog(&self, url: &Url) -> CatalogResult<Response> {
        let response = self
            .client
            .get(url.as_str())
            .header(auth::API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await?;

        tracing::debug!("Catalog responded {} for {}", response.status(), url);
        Ok(response)
    }

    /// Maps status codes and decodes a catalog JSON body
    pub async fn decode_json<T: DeserializeOwned>(response: Response) -> CatalogResult<T> {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(CatalogError::Unauthorized {
                    status: status.as_u16(),
                })
            }
            s if !s.is_success() => {
                return Err(CatalogError::ServerError {
                    status: s.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Opens a browser-style GET against a download URL
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ServerError` for any non-2xx status
    pub async fn get_download(&self, url: &Url) -> DownloadResult<Response> {
        let response = self
            .client
            .get(url.as_str())
            .headers(Self::browser_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        tracing::debug!("Download stream opened: {}", url);
        Ok(response)
    }

    /// Fixed header set mimicking a browser navigation
    ///
    /// `Accept-Encoding` is left to reqwest so compressed bodies are decoded.
    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(http::BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(http::BROWSER_ACCEPT_LANGUAGE),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            "upgrade-insecure-requests",
            HeaderValue::from_static("1"),
        );
        headers
    }
}
