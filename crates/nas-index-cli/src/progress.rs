use indicatif::{ProgressBar, ProgressStyle};
use nas_index_core::ProgressReporter;

/// CLI progress reporter: a spinner, since the tree size is unknown upfront.
pub struct CliReporter {
    bar: ProgressBar,
}

impl CliReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        Self { bar }
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.bar.set_message("Scanning...");
        self.bar
            .enable_steady_tick(std::time::Duration::from_millis(80));
    }

    fn on_directory_scanned(&self, dirs_scanned: u64, files_indexed: u64, current_path: &str) {
        self.bar.set_message(format!(
            "Scanning... {} dirs, {} files | {}",
            dirs_scanned, files_indexed, current_path
        ));
    }

    fn on_scan_complete(&self, files_indexed: u64, duration_secs: f64) {
        self.bar.finish_and_clear();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files indexed in {:.2}s",
            files_indexed, duration_secs
        );
    }
}
