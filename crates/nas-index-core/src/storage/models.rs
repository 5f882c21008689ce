/// One row per absolute path ever observed, keyed uniquely by path.
///
/// Re-scanning an unchanged path updates `scanned_at` but never duplicates
/// the row. Timestamps are nanoseconds since the epoch so the resume
/// comparison is exact.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub size: i64,
    pub mtime_ns: i64,
    pub atime_ns: i64,
    pub ctime_ns: i64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub dev: i64,
    pub inode: i64,
    /// Hex BLAKE3 digest; present only when hashing was enabled and succeeded.
    pub content_hash: Option<String>,
    pub mime: Option<String>,
    /// JSON map of extractor-contributed attributes.
    pub attrs: Option<String>,
    /// Error marker when extraction or hashing failed for this path.
    pub error: Option<String>,
    pub scanned_at: String,
}

/// A content hash shared by two or more distinct paths. Derived on demand
/// from `file_record`, never stored.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub content_hash: String,
    pub files: Vec<DuplicateMember>,
}

#[derive(Debug, Clone)]
pub struct DuplicateMember {
    pub path: String,
    pub size: i64,
    pub mtime_ns: i64,
}
