//! Screenshot sink behavior

mod common;

use common::ScriptedDriver;
use pageflow::diag::DiagnosticSink;
use pageflow::ScreenshotSink;

#[test]
fn screenshot_sink_writes_one_png_per_capture() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ScreenshotSink::new(dir.path());
    let mut driver = ScriptedDriver::new();

    sink.capture(&mut driver, "item-2_ERROR");

    let path = dir.path().join("item-2_ERROR.png");
    let bytes = std::fs::read(&path).expect("screenshot file missing");
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
}

#[test]
fn capture_failure_is_swallowed_not_propagated() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ScreenshotSink::new(dir.path());
    let mut driver = ScriptedDriver::new();
    driver.fail_capture = true;

    // must neither panic nor write anything
    sink.capture(&mut driver, "broken");
    assert!(!dir.path().join("broken.png").exists());
}

#[test]
fn labels_are_sanitized_into_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ScreenshotSink::new(dir.path());
    let mut driver = ScriptedDriver::new();

    sink.capture(&mut driver, "batch/item 3:ERROR");
    assert!(dir.path().join("batch_item_3_ERROR.png").exists());
}
