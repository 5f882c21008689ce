pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod hasher;
pub mod platform;
pub mod progress;
pub mod queue;
pub mod storage;
pub mod visited;
mod worker;

pub use config::ScanConfig;
pub use engine::{ScanEngine, ScanReport};
pub use error::Error;
pub use extractor::{default_extractors, ExtractError, MetadataExtractor, MetadataFragment};
pub use progress::{ProgressReporter, SilentReporter};
