mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use nas_index_core::config::{self, FileDefaults, ScanConfig, DEFAULT_DB_PATH, DEFAULT_WORKERS};
use nas_index_core::storage::models::DuplicateGroup;
use nas_index_core::storage::Database;
use nas_index_core::ScanEngine;
use progress::CliReporter;
use tracing::{error, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let defaults = match config::load_file_defaults() {
        Ok(defaults) => defaults,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan {
            root,
            db,
            follow_symlinks,
            hash,
            workers,
            pattern,
            min_size,
            max_size,
            no_resume,
        }) => {
            let mut scan_config = ScanConfig::new(root);
            if let Some(db) = db {
                scan_config.db_path = db;
            }
            scan_config.follow_symlinks = follow_symlinks;
            scan_config.compute_hash = hash;
            if let Some(workers) = workers {
                scan_config.workers = workers;
            }
            scan_config.name_pattern = pattern;
            if let Some(min_size) = min_size {
                scan_config.min_size = min_size;
            }
            scan_config.max_size = max_size;
            scan_config.resume = !no_resume;
            scan_config.apply_defaults(&defaults);

            if let Err(err) = run_scan(scan_config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Duplicates { db }) => {
            let db_path = db
                .or(defaults.db_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
            if let Err(err) = run_duplicates(&db_path) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::PrintConfig) => {
            print_effective_config(&defaults);
        }
        Some(Commands::TruncateDb { db }) => {
            let db_path = db
                .or(defaults.db_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
            match prompt_confirm("Are you SURE you want to delete every indexed row?", false) {
                Ok(true) => match Database::open(&db_path) {
                    Ok(db) => {
                        if let Err(e) = db.truncate_all() {
                            error!("Error truncating database: {}", e);
                        } else {
                            println!("All tables truncated");
                        }
                    }
                    Err(e) => error!("Error opening database: {}", e),
                },
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

/// What a `scan` invocation with no flags would actually use: file-backed
/// defaults where present, built-in values otherwise.
fn print_effective_config(defaults: &FileDefaults) {
    let db_path = defaults
        .db_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    let workers = defaults.workers.unwrap_or(DEFAULT_WORKERS);

    println!("Effective configuration:");
    println!("  db_path:         {}", db_path.display());
    println!("  workers:         {}", workers);
    println!(
        "  name_pattern:    {}",
        defaults.name_pattern.as_deref().unwrap_or("(none)")
    );
    println!("  follow_symlinks: false (set per scan with --follow-symlinks)");
    println!("  compute_hash:    false (set per scan with --hash)");
    println!("  min_size:        0");
    println!("  max_size:        (none)");
    println!("  resume:          on (disable per scan with --no-resume)");
}

fn run_scan(config: ScanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config.db_path.clone();
    let engine = ScanEngine::new(config);

    let cancel = engine.cancel_flag();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, letting in-flight work finish");
        cancel.store(true, Ordering::Relaxed);
    })?;

    let reporter = CliReporter::new();
    let report = engine.run(&reporter)?;

    println!();
    if !report.completed {
        println!("{}", "Scan interrupted by user".yellow());
    }
    println!(
        "Elapsed: {}  Dirs: {}  Files indexed: {}  Resume skips: {}  Filter skips: {}  Errors: {}",
        format!("{:.2}s", report.duration.as_secs_f64()).green(),
        report.dirs_scanned,
        format!("{}", report.files_indexed).green(),
        report.files_skipped_resume,
        report.files_skipped_filter,
        if report.entry_errors > 0 {
            format!("{}", report.entry_errors).red()
        } else {
            "0".normal()
        },
    );

    run_duplicates(&db_path)
}

fn run_duplicates(db_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(db_path)?;
    let groups = db.find_duplicates()?;

    if groups.is_empty() {
        println!("No duplicate content found (based on computed hashes)");
        return Ok(());
    }

    println!(
        "{} duplicate content group(s):",
        format!("{}", groups.len()).red()
    );
    for group in &groups {
        print_group(group);
    }
    Ok(())
}

fn print_group(group: &DuplicateGroup) {
    println!(
        "  {} ({} files)",
        &group.content_hash[..16.min(group.content_hash.len())],
        group.files.len()
    );
    for member in &group.files {
        let modified = chrono::DateTime::from_timestamp(
            member.mtime_ns.div_euclid(1_000_000_000),
            member.mtime_ns.rem_euclid(1_000_000_000) as u32,
        )
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
        println!("    {} ({} bytes, modified {})", member.path, member.size, modified);
    }
}

/// Ask a yes/no question on stdin; an empty answer takes `default`.
fn prompt_confirm(prompt: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    let mut input = String::new();

    loop {
        input.clear();
        print!("{prompt} {hint}: ");
        io::stdout().flush()?;
        io::stdin().read_line(&mut input)?;

        match input.trim() {
            "" => return Ok(default),
            s if s.eq_ignore_ascii_case("y") => return Ok(true),
            s if s.eq_ignore_ascii_case("n") => return Ok(false),
            _ => continue,
        }
    }
}
