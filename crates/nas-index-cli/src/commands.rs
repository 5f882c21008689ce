use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nas-index")]
#[command(about = "Concurrent, resumable filesystem indexer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree and index per-file metadata
    Scan {
        /// Root path to scan
        root: PathBuf,

        /// SQLite store location
        #[arg(long)]
        db: Option<PathBuf>,

        /// Follow symbolic links (cycle-guarded by physical identity)
        #[arg(long)]
        follow_symlinks: bool,

        /// Compute a BLAKE3 content hash per file (slow on large trees)
        #[arg(long)]
        hash: bool,

        /// Number of worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Only index files whose name matches this glob, e.g. '*.nc'
        #[arg(long)]
        pattern: Option<String>,

        /// Minimum file size in bytes
        #[arg(long)]
        min_size: Option<u64>,

        /// Maximum file size in bytes
        #[arg(long)]
        max_size: Option<u64>,

        /// Re-process every file even when size and mtime are unchanged
        #[arg(long)]
        no_resume: bool,
    },
    /// Report duplicate content groups from an existing store
    Duplicates {
        /// SQLite store location
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print effective configuration values
    PrintConfig,
    /// Delete every indexed row from the store
    TruncateDb {
        /// SQLite store location
        #[arg(long)]
        db: Option<PathBuf>,
    },
}
