use crate::config::ScanConfig;
use crate::error::Error;
use crate::extractor::{default_extractors, MetadataExtractor};
use crate::platform;
use crate::progress::ProgressReporter;
use crate::queue::WorkQueue;
use crate::storage::Database;
use crate::visited::VisitedSet;
use crate::worker::{self, WorkerContext};
use glob::Pattern;
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct ScanEngine {
    config: ScanConfig,
    extractors: Arc<Vec<Box<dyn MetadataExtractor>>>,
    cancel: Arc<AtomicBool>,
}

/// Aggregate counters shared by all workers.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub dirs_scanned: AtomicU64,
    pub files_indexed: AtomicU64,
    pub files_skipped_filter: AtomicU64,
    pub files_skipped_resume: AtomicU64,
    pub entry_errors: AtomicU64,
}

impl ScanStats {
    pub(crate) fn record_dir(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_file(&self) {
        self.files_indexed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_filter_skip(&self) {
        self.files_skipped_filter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_resume_skip(&self) {
        self.files_skipped_resume.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.entry_errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Result of a completed (or interrupted) scan.
#[derive(Debug)]
pub struct ScanReport {
    pub duration: Duration,
    pub dirs_scanned: u64,
    pub files_indexed: u64,
    pub files_skipped_filter: u64,
    pub files_skipped_resume: u64,
    pub entry_errors: u64,
    /// False when the scan was interrupted before the queue drained.
    pub completed: bool,
}

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            extractors: Arc::new(default_extractors()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the extractor registry. The list is consulted in order per
    /// file; a catch-all extractor belongs last.
    pub fn with_extractors(mut self, extractors: Vec<Box<dyn MetadataExtractor>>) -> Self {
        self.extractors = Arc::new(extractors);
        self
    }

    /// Flag observed by every worker; setting it stops new claims promptly
    /// while in-flight directories finish.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Walk the tree to queue exhaustion:
    /// 1. Validate the root, open the store, compile the name filter
    /// 2. Seed the queue with the root and spawn the worker pool
    /// 3. Join workers and aggregate counters
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<ScanReport, Error> {
        let start = Instant::now();

        let root_metadata = fs::metadata(&self.config.root)
            .map_err(|_| Error::RootNotFound(self.config.root.clone()))?;
        if !root_metadata.is_dir() {
            return Err(Error::RootNotFound(self.config.root.clone()));
        }

        let pattern = self
            .config
            .name_pattern
            .as_deref()
            .map(Pattern::new)
            .transpose()?;

        let db = Database::open(&self.config.db_path)?;

        let visited = Arc::new(VisitedSet::new());
        if let Some(identity) = platform::file_identity(&root_metadata) {
            visited.mark_visited(identity);
        }

        let queue = WorkQueue::new();
        queue.push(self.config.root.clone());

        self.cancel.store(false, Ordering::Relaxed);

        let worker_count = self.config.workers.max(1);
        let context = Arc::new(WorkerContext {
            config: self.config.clone(),
            pattern,
            db: Mutex::new(db),
            queue,
            visited,
            extractors: Arc::clone(&self.extractors),
            stats: ScanStats::default(),
            cancel: Arc::clone(&self.cancel),
            scanned_at: chrono::Utc::now().to_rfc3339(),
        });

        info!(
            root = %self.config.root.display(),
            workers = worker_count,
            hash = self.config.compute_hash,
            resume = self.config.resume,
            "Starting scan"
        );
        reporter.on_scan_start();

        thread::scope(|scope| {
            for id in 0..worker_count {
                let context = Arc::clone(&context);
                thread::Builder::new()
                    .name(format!("indexer-{id}"))
                    .spawn_scoped(scope, move || worker::worker_loop(id, &context, reporter))
                    .map_err(Error::Io)?;
            }
            Ok::<_, Error>(())
        })?;

        let completed = !self.cancel.load(Ordering::Relaxed);
        if !completed {
            warn!("Scan interrupted before queue exhaustion");
        }

        let stats = &context.stats;
        let report = ScanReport {
            duration: start.elapsed(),
            dirs_scanned: stats.dirs_scanned.load(Ordering::Relaxed),
            files_indexed: stats.files_indexed.load(Ordering::Relaxed),
            files_skipped_filter: stats.files_skipped_filter.load(Ordering::Relaxed),
            files_skipped_resume: stats.files_skipped_resume.load(Ordering::Relaxed),
            entry_errors: stats.entry_errors.load(Ordering::Relaxed),
            completed,
        };

        reporter.on_scan_complete(report.files_indexed, report.duration.as_secs_f64());
        debug!(
            "Scan finished in {:.2}s: {} dirs, {} files indexed, {} resume skips, {} errors",
            report.duration.as_secs_f64(),
            report.dirs_scanned,
            report.files_indexed,
            report.files_skipped_resume,
            report.entry_errors,
        );

        Ok(report)
    }
}
