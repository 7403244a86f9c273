#![cfg(unix)]

use imagesnap_bot::capture::{CaptureError, ExternalCapture, ImageCapture};
use std::path::Path;

fn sh(script: &str, dir: &Path) -> ExternalCapture {
    // The destination path is appended last and arrives as $0.
    ExternalCapture::new("/bin/sh", vec!["-c".to_string(), script.to_string()], dir)
}

fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read temp dir").count()
}

#[tokio::test]
async fn test_successful_capture_returns_written_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let capture = sh("echo jpeg > \"$0\"", dir.path());

    let image = capture.capture().await.expect("capture succeeds");
    assert_eq!(image.path().parent(), Some(dir.path()));
    assert_eq!(
        std::fs::read_to_string(image.path()).expect("read image"),
        "jpeg\n"
    );

    image.remove().await.expect("remove image");
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_non_zero_exit_is_failure_with_code() {
    let dir = tempfile::tempdir().expect("temp dir");
    let capture = sh("echo 'no video devices found' >&2; exit 3", dir.path());

    match capture.capture().await {
        Err(CaptureError::Failed { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "no video devices found");
        }
        other => panic!("expected a failed capture, got {other:?}"),
    }
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_failed_capture_discards_partial_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let capture = sh("echo partial > \"$0\"; exit 1", dir.path());

    let err = capture.capture().await.expect_err("capture fails");
    assert!(matches!(err, CaptureError::Failed { code: Some(1), .. }));
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn test_success_without_output_is_missing_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let capture = sh("exit 0", dir.path());

    let err = capture.capture().await.expect_err("nothing written");
    assert!(matches!(err, CaptureError::MissingOutput(_)));
    assert_eq!(files_in(dir.path()), 0);
}
