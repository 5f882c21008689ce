use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "nas_index.db";
pub const DEFAULT_WORKERS: usize = 8;

/// Configuration parameters controlling scan behaviour. Built
/// programmatically (CLI flags or embedding code), then topped up from
/// file-backed defaults via [`ScanConfig::apply_defaults`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub follow_symlinks: bool,
    pub compute_hash: bool,
    pub workers: usize,
    pub name_pattern: Option<String>,
    pub min_size: u64,
    pub max_size: Option<u64>,
    pub resume: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            db_path: default_db_path(),
            follow_symlinks: false,
            compute_hash: false,
            workers: DEFAULT_WORKERS,
            name_pattern: None,
            min_size: 0,
            max_size: None,
            resume: true,
        }
    }

    /// Fill in values the caller left unset from file-based defaults.
    pub fn apply_defaults(&mut self, defaults: &FileDefaults) {
        if let Some(db_path) = &defaults.db_path {
            if self.db_path == default_db_path() {
                self.db_path = db_path.clone();
            }
        }
        if let Some(workers) = defaults.workers {
            if self.workers == DEFAULT_WORKERS {
                self.workers = workers;
            }
        }
        if self.name_pattern.is_none() {
            self.name_pattern = defaults.name_pattern.clone();
        }
    }
}

/// Optional defaults loaded from a `Config.toml` next to the working directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileDefaults {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub name_pattern: Option<String>,
}

pub fn load_file_defaults() -> Result<FileDefaults, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<FileDefaults>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ScanConfig::new("/data");
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(!config.follow_symlinks);
        assert!(!config.compute_hash);
        assert!(config.resume);
        assert_eq!(config.min_size, 0);
        assert!(config.max_size.is_none());
    }

    #[test]
    fn test_apply_defaults_respects_explicit_values() {
        let mut config = ScanConfig::new("/data");
        config.workers = 2;
        let defaults = FileDefaults {
            db_path: Some(PathBuf::from("other.db")),
            workers: Some(16),
            name_pattern: Some("*.nc".to_string()),
        };
        config.apply_defaults(&defaults);
        // workers was set explicitly, so the file default must not win
        assert_eq!(config.workers, 2);
        assert_eq!(config.db_path, PathBuf::from("other.db"));
        assert_eq!(config.name_pattern.as_deref(), Some("*.nc"));
    }
}
