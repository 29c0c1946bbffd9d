//! Best-effort diagnostic capture
//!
//! The orchestrator calls a [`DiagnosticSink`] when an item fails. Capture is
//! strictly best-effort: a sink failure is logged and never escalated, so a broken
//! screenshot pipeline cannot abort a batch.

use crate::driver::PageDriver;
use std::path::{Path, PathBuf};

/// Consumer of failure diagnostics
pub trait DiagnosticSink<D: PageDriver> {
    /// Capture the session's current state under the given label. Must not fail
    /// upward; implementations log their own errors.
    fn capture(&self, driver: &mut D, label: &str);
}

/// Sink that discards all captures
#[derive(Default)]
pub struct NullSink;

impl<D: PageDriver> DiagnosticSink<D> for NullSink {
    fn capture(&self, _driver: &mut D, _label: &str) {}
}

/// Sink that persists a PNG screenshot per capture under an output directory
pub struct ScreenshotSink {
    output_dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        ScreenshotSink { output_dir: output_dir.into() }
    }

    /// Reduce a label to a safe file stem
    fn file_name(label: &str) -> String {
        let stem: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{stem}.png")
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl<D: PageDriver> DiagnosticSink<D> for ScreenshotSink {
    fn capture(&self, driver: &mut D, label: &str) {
        let path = self.output_dir.join(Self::file_name(label));
        let png = match driver.capture_page() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("diagnostic capture '{}' failed: {}", label, e);
                return;
            }
        };
        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            log::warn!("could not create diagnostics dir {}: {}", self.output_dir.display(), e);
            return;
        }
        match std::fs::write(&path, png) {
            Ok(()) => log::info!("diagnostic screenshot saved to {}", path.display()),
            Err(e) => log::warn!("could not write diagnostic screenshot {}: {}", path.display(), e),
        }
    }
}
