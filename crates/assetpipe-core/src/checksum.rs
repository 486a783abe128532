//! SHA-256 over files on disk.
//!
//! The fetcher always digests the final file by reading it back rather than
//! hashing the stream, so the value reflects exactly what landed on disk.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read chunk (1 MiB), matching the streaming write chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    sha256_path_chunked(path, DEFAULT_CHUNK_SIZE)
}

/// Like [`sha256_path`] but reads in `chunk_size` pieces.
pub fn sha256_path_chunked(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compare two hex digests ignoring case and surrounding whitespace.
pub fn digests_match(expected: &str, computed: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(computed.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn chunk_size_does_not_change_digest() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let body: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        f.write_all(&body).unwrap();
        f.flush().unwrap();
        let a = sha256_path_chunked(f.path(), 7).unwrap();
        let b = sha256_path_chunked(f.path(), 4096).unwrap();
        let c = sha256_path(f.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn digests_match_ignores_case() {
        assert!(digests_match("ABCDEF", "abcdef"));
        assert!(digests_match(" abc\n", "abc"));
        assert!(!digests_match("deadbeef", "abc"));
    }
}
