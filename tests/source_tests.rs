//! Tests for archive byte sources.

use unbundle::source::{from_arg, is_http_url};
use unbundle::{ArchiveSource, EmbeddedSource, LocalFileSource, ZipArchive};

mod common;
use common::helpers::*;

#[test]
fn test_is_http_url() {
    assert!(is_http_url("http://example.com/payload.zip"));
    assert!(is_http_url("https://example.com/payload.zip"));
    assert!(!is_http_url("payload.zip"));
    assert!(!is_http_url("/tmp/http/payload.zip"));
}

#[test]
fn test_from_arg_selects_source() {
    assert_eq!(
        from_arg(Some("https://example.com/payload.zip")).describe(),
        "https://example.com/payload.zip"
    );
    assert_eq!(from_arg(Some("payload.zip")).describe(), "payload.zip");
    assert_eq!(from_arg(None).describe(), "embedded payload");
}

#[tokio::test]
async fn test_local_file_source_reads_archive() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("payload.zip");
    let archive = build_archive(&[("x.txt", "data")]);
    std::fs::write(&path, &archive).expect("write archive");

    let bytes = LocalFileSource::new(&path).load().await.expect("load");

    assert_eq!(bytes, archive);
    assert_eq!(ZipArchive::new(&bytes).expect("open").len(), 1);
}

#[tokio::test]
async fn test_local_file_source_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = temp.path().join("missing.zip");

    let error = LocalFileSource::new(&path)
        .load()
        .await
        .expect_err("missing file");

    assert!(error.to_string().contains("missing.zip"));
}

#[tokio::test]
async fn test_embedded_source_reads_running_executable() {
    let bytes = EmbeddedSource.load().await.expect("load");
    let exe = std::env::current_exe().expect("current exe");

    assert_eq!(bytes.len() as u64, std::fs::metadata(exe).expect("metadata").len());
}
