use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid name pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Scan root '{}' does not exist or is not a directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("{0}")]
    Other(String),
}
