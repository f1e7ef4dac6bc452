//! Integration tests for download fulfillment
//!
//! These run the engine against a mock CDN and check what ends up on disk.

mod common;

use cmpdl::app::{DownloadEngine, PipelineEvent, ProgressReporter, RetryPolicy};
use httpmock::prelude::*;
use tempfile::TempDir;

use common::{artifact, client_for, mock_download};

#[tokio::test]
async fn test_valid_file_is_skipped_without_request() {
    let server = MockServer::start_async().await;
    let body = b"jar contents".to_vec();
    let download = mock_download(&server, "a.jar", &body).await;

    let dest = TempDir::new().unwrap();
    std::fs::create_dir_all(dest.path().join("mods")).unwrap();
    std::fs::write(dest.path().join("mods/a.jar"), &body).unwrap();
    let before = std::fs::metadata(dest.path().join("mods/a.jar"))
        .unwrap()
        .modified()
        .unwrap();

    let client = client_for(&server);
    let engine = DownloadEngine::new(&client, RetryPolicy::none(), ProgressReporter::disabled());
    let report = engine
        .fulfill(&[artifact(&server, "a.jar", &body)], dest.path())
        .await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.downloaded, 0);
    download.assert_hits_async(0).await;
    assert_eq!(std::fs::read(dest.path().join("mods/a.jar")).unwrap(), body);
    let after = std::fs::metadata(dest.path().join("mods/a.jar"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_failed_download_does_not_stop_the_next() {
    let server = MockServer::start_async().await;
    let broken = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/broken.jar");
            then.status(500);
        })
        .await;
    let good_body = b"good".to_vec();
    let good = mock_download(&server, "good.jar", &good_body).await;

    let dest = TempDir::new().unwrap();
    let client = client_for(&server);
    let (reporter, mut rx) = ProgressReporter::channel();
    let engine = DownloadEngine::new(&client, RetryPolicy::none(), reporter);

    let artifacts = [
        artifact(&server, "broken.jar", b"never served"),
        artifact(&server, "good.jar", &good_body),
    ];
    let report = engine.fulfill(&artifacts, dest.path()).await;
    drop(engine);

    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "broken.jar");
    broken.assert_hits_async(1).await;
    good.assert_hits_async(1).await;

    assert!(!dest.path().join("mods/broken.jar").exists());
    assert!(!dest.path().join("mods/broken.jar.part").exists());
    assert_eq!(std::fs::read(dest.path().join("mods/good.jar")).unwrap(), good_body);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert!(matches!(
        &events[1],
        PipelineEvent::DownloadFailed { index: 1, total: 2, .. }
    ));
    assert!(matches!(
        &events[3],
        PipelineEvent::Downloaded { index: 2, total: 2, .. }
    ));
}

#[tokio::test]
async fn test_stale_file_is_replaced() {
    let server = MockServer::start_async().await;
    let body = b"fresh jar".to_vec();
    let download = mock_download(&server, "a.jar", &body).await;

    let dest = TempDir::new().unwrap();
    std::fs::create_dir_all(dest.path().join("mods")).unwrap();
    std::fs::write(dest.path().join("mods/a.jar"), b"stale jar").unwrap();

    let client = client_for(&server);
    let (reporter, mut rx) = ProgressReporter::channel();
    let engine = DownloadEngine::new(&client, RetryPolicy::none(), reporter);
    let report = engine
        .fulfill(&[artifact(&server, "a.jar", &body)], dest.path())
        .await;
    drop(engine);

    assert_eq!(report.downloaded, 1);
    assert_eq!(report.replaced, 1);
    download.assert_hits_async(1).await;
    assert_eq!(std::fs::read(dest.path().join("mods/a.jar")).unwrap(), body);

    let first = rx.recv().await.unwrap();
    assert!(matches!(first, PipelineEvent::ExistingInvalid { index: 1, .. }));
    let second = rx.recv().await.unwrap();
    assert!(matches!(second, PipelineEvent::Downloading { index: 1, .. }));
}

#[tokio::test]
async fn test_file_without_md5_is_fetched_again() {
    let server = MockServer::start_async().await;
    let body = b"unverifiable".to_vec();
    let download = mock_download(&server, "a.jar", &body).await;

    let dest = TempDir::new().unwrap();
    std::fs::create_dir_all(dest.path().join("mods")).unwrap();
    std::fs::write(dest.path().join("mods/a.jar"), &body).unwrap();

    let mut descriptor = artifact(&server, "a.jar", &body);
    descriptor.hashes.truncate(1);

    let client = client_for(&server);
    let engine = DownloadEngine::new(&client, RetryPolicy::none(), ProgressReporter::disabled());
    let report = engine.fulfill(&[descriptor], dest.path()).await;

    assert_eq!(report.skipped, 0);
    assert_eq!(report.downloaded, 1);
    download.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_download_retry_is_bounded() {
    let server = MockServer::start_async().await;
    let broken = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/flaky.jar");
            then.status(503);
        })
        .await;

    let dest = TempDir::new().unwrap();
    let client = client_for(&server);
    let retry = RetryPolicy {
        max_retries: 2,
        base_delay: std::time::Duration::from_millis(1),
    };
    let engine = DownloadEngine::new(&client, retry, ProgressReporter::disabled());
    let report = engine
        .fulfill(&[artifact(&server, "flaky.jar", b"x")], dest.path())
        .await;

    assert_eq!(report.failed.len(), 1);
    broken.assert_hits_async(3).await;
}

#[tokio::test]
async fn test_blocked_destination_leaves_no_partial() {
    let server = MockServer::start_async().await;
    let body = b"jar bytes".to_vec();
    mock_download(&server, "a.jar", &body).await;

    let dest = TempDir::new().unwrap();
    let blocked = dest.path().join("mods/a.jar");
    std::fs::create_dir_all(&blocked).unwrap();
    std::fs::write(blocked.join("inner.txt"), "x").unwrap();

    let client = client_for(&server);
    let engine = DownloadEngine::new(&client, RetryPolicy::none(), ProgressReporter::disabled());
    let report = engine
        .fulfill(&[artifact(&server, "a.jar", &body)], dest.path())
        .await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_name, "a.jar");
    assert!(report.failed[0].reason.contains("could not rename"));
    assert!(!dest.path().join("mods/a.jar.part").exists());
}
