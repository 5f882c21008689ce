/// Trait for reporting scan progress.
///
/// The CLI implements this with indicatif; tests and embedders use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_directory_scanned(&self, _dirs_scanned: u64, _files_indexed: u64, _current_path: &str) {}
    fn on_scan_complete(&self, _files_indexed: u64, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
