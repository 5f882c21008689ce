use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Block size for streaming reads. Large enough to amortise syscalls on NAS
/// mounts, small enough to bound per-worker memory.
const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Stream a file through BLAKE3 in fixed-size blocks and return the
/// hex-encoded digest.
///
/// Hashing is the dominant cost of a scan with `--hash` enabled; callers
/// must not hold the store lock across this call.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_identical_content_identical_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.bin");
        let path_b = dir.path().join("b.bin");
        std::fs::write(&path_a, b"same bytes").unwrap();
        std::fs::write(&path_b, b"same bytes").unwrap();

        assert_eq!(hash_file(&path_a).unwrap(), hash_file(&path_b).unwrap());
        assert_eq!(hash_file(&path_a).unwrap(), hash_bytes(b"same bytes"));
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let content = vec![0x5Au8; 3 * 1024 * 1024 + 17];
        let mut file = File::create(&path).unwrap();
        file.write_all(&content).unwrap();
        drop(file);

        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&content));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b""));
    }
}
