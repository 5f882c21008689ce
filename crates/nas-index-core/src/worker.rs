//! Worker loop for the traversal pool.
//!
//! Every worker runs the same loop: claim a pending directory, list its
//! entries, push subdirectories back onto the queue (gated by the visited
//! set) and index regular files. There is no coordinator thread; the run
//! ends when every worker has independently observed an idle queue.

use crate::config::ScanConfig;
use crate::engine::ScanStats;
use crate::extractor::MetadataExtractor;
use crate::hasher;
use crate::platform;
use crate::progress::ProgressReporter;
use crate::queue::WorkQueue;
use crate::storage::models::FileRecord;
use crate::storage::Database;
use crate::visited::VisitedSet;
use glob::Pattern;
use std::fs::{self, Metadata};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// How long a claim waits before the worker re-checks for an idle queue.
const CLAIM_TIMEOUT: Duration = Duration::from_millis(100);

/// Everything a worker needs, shared across the pool.
pub(crate) struct WorkerContext {
    pub config: ScanConfig,
    pub pattern: Option<Pattern>,
    pub db: Mutex<Database>,
    pub queue: WorkQueue,
    pub visited: Arc<VisitedSet>,
    pub extractors: Arc<Vec<Box<dyn MetadataExtractor>>>,
    pub stats: ScanStats,
    pub cancel: Arc<AtomicBool>,
    pub scanned_at: String,
}

impl WorkerContext {
    /// Serialized access to the store. A poisoned mutex means another worker
    /// panicked mid-write; the store itself is still consistent (one
    /// transaction per record), so we keep going with the inner value.
    fn store(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

pub(crate) fn worker_loop(id: usize, ctx: &WorkerContext, reporter: &dyn ProgressReporter) {
    debug!(worker = id, "Worker starting");

    loop {
        if ctx.cancel.load(Ordering::Relaxed) {
            debug!(worker = id, "Cancellation observed, exiting");
            break;
        }

        let dir = match ctx.queue.claim(CLAIM_TIMEOUT) {
            Some(dir) => dir,
            None => {
                if ctx.queue.is_idle() {
                    break;
                }
                // Another worker is mid-directory and may still push work.
                continue;
            }
        };

        let _guard = ctx.queue.claim_guard();
        process_directory(id, &dir, ctx);
        reporter.on_directory_scanned(
            ctx.stats.dirs_scanned.load(Ordering::Relaxed),
            ctx.stats.files_indexed.load(Ordering::Relaxed),
            &dir.to_string_lossy(),
        );
    }

    debug!(
        worker = id,
        dirs = ctx.stats.dirs_scanned.load(Ordering::Relaxed),
        files = ctx.stats.files_indexed.load(Ordering::Relaxed),
        "Worker exiting"
    );
}

/// List one directory and classify its entries. Listing failures are scoped
/// to this directory; entry failures are scoped to the single entry.
fn process_directory(worker: usize, dir: &Path, ctx: &WorkerContext) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(worker, dir = %dir.display(), error = %err, "Cannot list directory, skipping");
            ctx.stats.record_error();
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(worker, dir = %dir.display(), error = %err, "Bad directory entry, skipping");
                ctx.stats.record_error();
                continue;
            }
        };
        let path = entry.path();

        let metadata = match stat_entry(&path, ctx.config.follow_symlinks) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(worker, path = %path.display(), error = %err, "Stat failed, skipping entry");
                ctx.stats.record_error();
                continue;
            }
        };

        if metadata.is_dir() {
            dispatch_directory(&path, &metadata, ctx);
        } else if metadata.is_file() {
            process_file(worker, &path, &metadata, ctx);
        }
        // Unfollowed symlinks and special files are not indexed.
    }

    ctx.stats.record_dir();
}

fn stat_entry(path: &Path, follow_symlinks: bool) -> std::io::Result<Metadata> {
    if follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
}

/// Cycle-breaking step: a physical directory already registered this run is
/// never enqueued again, no matter how many logical paths reach it.
fn dispatch_directory(path: &Path, metadata: &Metadata, ctx: &WorkerContext) {
    match platform::file_identity(metadata) {
        Some(identity) if !ctx.visited.mark_visited(identity) => {
            trace!(path = %path.display(), "Skipping already-visited directory");
        }
        _ => ctx.queue.push(path.to_path_buf()),
    }
}

fn process_file(worker: usize, path: &Path, metadata: &Metadata, ctx: &WorkerContext) {
    let size = metadata.len();

    if let Some(pattern) = &ctx.pattern {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !pattern.matches(&name) {
            trace!(path = %path.display(), "Skipping by name pattern");
            ctx.stats.record_filter_skip();
            return;
        }
    }

    if size < ctx.config.min_size || ctx.config.max_size.is_some_and(|max| size > max) {
        trace!(path = %path.display(), size, "Skipping by size filter");
        ctx.stats.record_filter_skip();
        return;
    }

    let timestamps = platform::timestamps(metadata);
    let path_str = path.to_string_lossy().into_owned();

    if ctx.config.resume && resume_skip(ctx, &path_str, size as i64, timestamps.mtime_ns) {
        trace!(path = %path_str, "Resume skip, unchanged since last scan");
        ctx.stats.record_resume_skip();
        return;
    }

    let record = build_record(worker, path, &path_str, metadata, ctx);

    match ctx.store().upsert_file(&record) {
        Ok(()) => ctx.stats.record_file(),
        Err(err) => {
            // No retry; the next scan of this path re-processes it.
            warn!(worker, path = %path_str, error = %err, "Store write failed");
            ctx.stats.record_error();
        }
    }
}

/// The resume oracle: skip iff the stored size and mtime exactly match the
/// already-captured stat, and a hash is not newly required. The stat captured
/// by the caller is the authoritative comparison input; the file changing
/// between lookup and stat is an accepted race, not a correctness hole.
fn resume_skip(ctx: &WorkerContext, path: &str, size: i64, mtime_ns: i64) -> bool {
    let lookup = ctx.store().lookup_file(path);
    match lookup {
        Ok(Some(row)) => {
            row.size == size
                && row.mtime_ns == mtime_ns
                && (!ctx.config.compute_hash || row.content_hash.is_some())
        }
        Ok(None) => false,
        Err(err) => {
            warn!(path, error = %err, "Resume lookup failed, re-processing");
            false
        }
    }
}

/// Assemble the full record: base filesystem fields, optional content hash,
/// then the fragment from the first matching extractor. Hashing and
/// extraction failures mark the record but never drop it.
fn build_record(
    worker: usize,
    path: &Path,
    path_str: &str,
    metadata: &Metadata,
    ctx: &WorkerContext,
) -> FileRecord {
    let timestamps = platform::timestamps(metadata);
    let owner = platform::owner_info(metadata);
    let identity = platform::file_identity(metadata);

    let mut record = FileRecord {
        id: 0,
        path: path_str.to_string(),
        size: metadata.len() as i64,
        mtime_ns: timestamps.mtime_ns,
        atime_ns: timestamps.atime_ns,
        ctime_ns: timestamps.ctime_ns,
        mode: owner.mode,
        uid: owner.uid,
        gid: owner.gid,
        dev: identity.map_or(0, |i| i.dev as i64),
        inode: identity.map_or(0, |i| i.inode as i64),
        content_hash: None,
        mime: None,
        attrs: None,
        error: None,
        scanned_at: ctx.scanned_at.clone(),
    };

    if ctx.config.compute_hash {
        match hasher::hash_file(path) {
            Ok(hash) => record.content_hash = Some(hash),
            Err(err) => {
                warn!(worker, path = %path_str, error = %err, "Content hash failed");
                record.error = Some(format!("hash failed: {err}"));
            }
        }
    }

    if let Some(extractor) = ctx.extractors.iter().find(|e| e.can_handle(path)) {
        match extractor.extract(path, metadata) {
            Ok(fragment) => {
                if fragment.mime.is_some() {
                    record.mime = fragment.mime;
                }
                if !fragment.attributes.is_empty() {
                    record.attrs = serde_json::to_string(&fragment.attributes).ok();
                }
            }
            Err(err) => {
                warn!(
                    worker,
                    path = %path_str,
                    extractor = extractor.name(),
                    error = %err,
                    "Metadata extraction failed"
                );
                record.error = Some(format!("{}: {err}", extractor.name()));
            }
        }
    }

    record
}
