use std::fs::Metadata;

/// The (device, inode) pair uniquely identifying a filesystem object
/// regardless of the path used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub dev: u64,
    pub inode: u64,
}

impl FileIdentity {
    pub fn new(dev: u64, inode: u64) -> Self {
        Self { dev, inode }
    }
}

#[cfg(unix)]
pub fn file_identity(metadata: &Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some(FileIdentity::new(metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
pub fn file_identity(_metadata: &Metadata) -> Option<FileIdentity> {
    None
}

/// Ownership and permission fields as stored in the index.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerInfo {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

#[cfg(unix)]
pub fn owner_info(metadata: &Metadata) -> OwnerInfo {
    use std::os::unix::fs::MetadataExt;
    OwnerInfo {
        mode: metadata.mode(),
        uid: metadata.uid(),
        gid: metadata.gid(),
    }
}

#[cfg(not(unix))]
pub fn owner_info(_metadata: &Metadata) -> OwnerInfo {
    OwnerInfo::default()
}

/// Modification, access and change timestamps in nanoseconds since the epoch.
///
/// Nanosecond precision keeps the resume comparison exact across filesystems
/// that report subsecond mtimes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamps {
    pub mtime_ns: i64,
    pub atime_ns: i64,
    pub ctime_ns: i64,
}

#[cfg(unix)]
pub fn timestamps(metadata: &Metadata) -> Timestamps {
    use std::os::unix::fs::MetadataExt;
    Timestamps {
        mtime_ns: metadata.mtime() * 1_000_000_000 + metadata.mtime_nsec(),
        atime_ns: metadata.atime() * 1_000_000_000 + metadata.atime_nsec(),
        ctime_ns: metadata.ctime() * 1_000_000_000 + metadata.ctime_nsec(),
    }
}

#[cfg(not(unix))]
pub fn timestamps(metadata: &Metadata) -> Timestamps {
    use std::time::UNIX_EPOCH;
    let to_ns = |time: std::io::Result<std::time::SystemTime>| {
        time.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0)
    };
    Timestamps {
        mtime_ns: to_ns(metadata.modified()),
        atime_ns: to_ns(metadata.accessed()),
        ctime_ns: 0,
    }
}
