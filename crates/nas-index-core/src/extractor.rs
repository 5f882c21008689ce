//! Pluggable metadata extraction.
//!
//! Format coverage lives behind this boundary: an extractor declares which
//! paths it can handle and returns a fragment the worker merges into the
//! base record it already computed (size, timestamps, identity). The
//! registry is an explicit list assembled by the caller at startup; the
//! first extractor whose predicate matches wins, so a catch-all belongs
//! last.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Metadata contributed by an extractor for a single file.
#[derive(Debug, Clone, Default)]
pub struct MetadataFragment {
    /// MIME/type guess; overrides whatever an earlier stage produced.
    pub mime: Option<String>,
    /// Free-form domain attributes, persisted as JSON.
    pub attributes: BTreeMap<String, String>,
}

pub trait MetadataExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap predicate deciding whether this extractor applies to `path`.
    fn can_handle(&self, path: &Path) -> bool;

    /// Extract metadata for `path`. Failure is never fatal to the scan; the
    /// record is written with the base fields and an error marker.
    fn extract(&self, path: &Path, metadata: &Metadata) -> Result<MetadataFragment, ExtractError>;
}

/// Catch-all extractor: guesses a MIME type from the file extension.
pub struct MimeExtractor;

impl MetadataExtractor for MimeExtractor {
    fn name(&self) -> &'static str {
        "mime"
    }

    fn can_handle(&self, _path: &Path) -> bool {
        true
    }

    fn extract(&self, path: &Path, _metadata: &Metadata) -> Result<MetadataFragment, ExtractError> {
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(MetadataFragment {
            mime: Some(mime),
            ..MetadataFragment::default()
        })
    }
}

/// The registry used when the caller does not supply one.
pub fn default_extractors() -> Vec<Box<dyn MetadataExtractor>> {
    vec![Box::new(MimeExtractor)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_extractor_guesses_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        let metadata = std::fs::metadata(&path).unwrap();

        let fragment = MimeExtractor.extract(&path, &metadata).unwrap();
        assert_eq!(fragment.mime.as_deref(), Some("text/csv"));
    }

    #[test]
    fn test_mime_extractor_falls_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzz_unknown");
        std::fs::write(&path, [0u8; 4]).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();

        let fragment = MimeExtractor.extract(&path, &metadata).unwrap();
        assert_eq!(fragment.mime.as_deref(), Some("application/octet-stream"));
    }
}
