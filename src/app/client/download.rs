//! File download operations with atomic writes and streaming
//!
//! Bodies are streamed chunk by chunk into a `.part` file next to the
//! destination and renamed into place once complete, so an interrupted or
//! failed transfer never leaves a truncated file under the final name.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
    timeout: Option<Duration>,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler, timeout: Option<Duration>) -> Self {
        Self {
            http_handler,
            timeout,
        }
    }

    /// Streams `url` into `destination`, replacing any existing file
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL cannot be parsed
    /// - The server answers with a non-2xx status
    /// - The stream breaks or the file cannot be written
    /// - The configured timeout elapses
    pub async fn download_file(&self, url: &str, destination: &Path) -> DownloadResult<u64> {
        let parsed_url = Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = partial_path(destination);

        let attempt = self.stream_to_file(&parsed_url, &temp_path);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(DownloadError::Timeout {
                    seconds: limit.as_secs(),
                }),
            },
            None => attempt.await,
        };

        let written = match outcome {
            Ok(written) => written,
            Err(e) => {
                discard_partial(&temp_path).await;
                return Err(e);
            }
        };

        if let Err(source) = tokio::fs::rename(&temp_path, destination).await {
            discard_partial(&temp_path).await;
            return Err(DownloadError::AtomicOperationFailed {
                temp_path,
                final_path: destination.to_path_buf(),
                source,
            });
        }

        tracing::debug!(
            "Downloaded {} bytes to {}",
            written,
            destination.display()
        );
        Ok(written)
    }

    async fn stream_to_file(&self, url: &Url, temp_path: &Path) -> DownloadResult<u64> {
        let response = self.http_handler.get_download(url).await?;

        let mut file = File::create(temp_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

async fn discard_partial(temp_path: &Path) {
    if tokio::fs::try_exists(temp_path).await.unwrap_or(false) {
        if let Err(e) = tokio::fs::remove_file(temp_path).await {
            tracing::warn!("Could not remove {}: {}", temp_path.display(), e);
        }
    }
}

/// Path of the in-flight file for `destination`
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(files::PARTIAL_FILE_SUFFIX);
    destination.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::tempdir;

    use crate::app::client::config::ClientConfig;

    fn create_test_handler() -> HttpHandler {
        let config = ClientConfig::default();
        let client = config.build_http_client().unwrap();
        HttpHandler::new(client, "test-key", config.request_timeout)
    }

    #[test]
    fn test_partial_path_generation() {
        let path = Path::new("/tmp/mods/jei-1.12.2.jar");
        assert_eq!(
            partial_path(path),
            PathBuf::from("/tmp/mods/jei-1.12.2.jar.part")
        );
    }

    #[tokio::test]
    async fn test_download_replaces_existing_file() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/1234/567/a.jar");
                then.status(200).body("fresh bytes");
            })
            .await;

        let dir = tempdir().unwrap();
        let destination = dir.path().join("a.jar");
        tokio::fs::write(&destination, "stale content that is longer")
            .await
            .unwrap();

        let http = create_test_handler();
        let handler = DownloadHandler::new(&http, None);
        let written = handler
            .download_file(&server.url("/files/1234/567/a.jar"), &destination)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(written, 11);
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"fresh bytes");
        assert!(!partial_path(&destination).exists());
    }

    #[tokio::test]
    async fn test_server_error_leaves_existing_file() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.jar");
                then.status(404);
            })
            .await;

        let dir = tempdir().unwrap();
        let destination = dir.path().join("missing.jar");
        tokio::fs::write(&destination, "previous").await.unwrap();

        let http = create_test_handler();
        let handler = DownloadHandler::new(&http, None);
        let result = handler
            .download_file(&server.url("/missing.jar"), &destination)
            .await;

        assert!(matches!(
            result,
            Err(DownloadError::ServerError { status: 404 })
        ));
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"previous");
        assert!(!partial_path(&destination).exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/blocked.jar");
                then.status(200).body("jar bytes");
            })
            .await;

        // A non-empty directory under the final name cannot be replaced by a file
        let dir = tempdir().unwrap();
        let destination = dir.path().join("blocked.jar");
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("keep.txt"), "x").unwrap();

        let http = create_test_handler();
        let handler = DownloadHandler::new(&http, None);
        let result = handler
            .download_file(&server.url("/blocked.jar"), &destination)
            .await;

        match result {
            Err(DownloadError::AtomicOperationFailed { source, .. }) => {
                assert!(!source.to_string().is_empty());
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!partial_path(&destination).exists());
        assert!(destination.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let dir = tempdir().unwrap();
        let http = create_test_handler();
        let handler = DownloadHandler::new(&http, None);

        let result = handler
            .download_file("not-a-url", &dir.path().join("x.jar"))
            .await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }
}
