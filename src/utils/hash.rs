//! Hash calculation utilities.

use crate::core::error::{Error, Result};
use crate::core::types::digest_preview;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffer size for reading files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha256,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "MD5"),
            HashAlgorithm::Sha256 => write!(f, "SHA256"),
        }
    }
}

/// Digests of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigests {
    /// SHA256 hash (primary)
    pub sha256: String,
    /// MD5 hash (for compatibility)
    pub md5: String,
    /// Bytes read while hashing
    pub bytes_read: u64,
}

/// Hash calculator for files.
pub struct HashCalculator;

impl HashCalculator {
    /// Hash a file with a single algorithm, streaming it in fixed-size chunks.
    pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
        match algorithm {
            HashAlgorithm::Md5 => Self::stream_digest::<Md5>(path),
            HashAlgorithm::Sha256 => Self::stream_digest::<Sha256>(path),
        }
    }

    /// Calculate both SHA256 and MD5 hashes of a file in a single pass.
    pub fn digest_file(path: &Path) -> Result<FileDigests> {
        let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut sha256_hasher = Sha256::new();
        let mut md5_hasher = Md5::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut bytes_read = 0u64;

        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| Error::file_access(path, e))?;
            if n == 0 {
                break;
            }
            sha256_hasher.update(&buffer[..n]);
            md5_hasher.update(&buffer[..n]);
            bytes_read += n as u64;
        }

        Ok(FileDigests {
            sha256: hex::encode(sha256_hasher.finalize()),
            md5: hex::encode(md5_hasher.finalize()),
            bytes_read,
        })
    }

    /// Calculate SHA256 hash of bytes.
    pub fn sha256_bytes(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Calculate MD5 hash of bytes.
    pub fn md5_bytes(data: &[u8]) -> String {
        hex::encode(Md5::digest(data))
    }

    /// Short form of a digest for summaries.
    pub fn preview(digest: &str) -> &str {
        digest_preview(digest)
    }

    fn stream_digest<D: Digest>(path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut hasher = D::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let n = reader
                .read(&mut buffer)
                .map_err(|e| Error::file_access(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

    #[test]
    fn test_sha256_bytes() {
        let hash = HashCalculator::sha256_bytes(b"hello");
        assert_eq!(
            hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(HashCalculator::preview(&hash), "2cf24dba5fb0");
    }

    #[test]
    fn test_md5_bytes() {
        let hash = HashCalculator::md5_bytes(b"hello");
        assert_eq!(hash, "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_hash_file_per_algorithm() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let sha = HashCalculator::hash_file(file.path(), HashAlgorithm::Sha256).unwrap();
        let md5 = HashCalculator::hash_file(file.path(), HashAlgorithm::Md5).unwrap();
        assert_eq!(sha, HashCalculator::sha256_bytes(b"hello"));
        assert_eq!(md5, HashCalculator::md5_bytes(b"hello"));
    }

    #[test]
    fn test_digest_file_matches_single_pass() {
        // Larger than one buffer so the loop runs more than once.
        let data: Vec<u8> = (0..(BUFFER_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let digests = HashCalculator::digest_file(file.path()).unwrap();
        assert_eq!(digests.sha256, HashCalculator::sha256_bytes(&data));
        assert_eq!(digests.md5, HashCalculator::md5_bytes(&data));
        assert_eq!(digests.bytes_read, data.len() as u64);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let digests = HashCalculator::digest_file(file.path()).unwrap();
        assert_eq!(digests.sha256, EMPTY_SHA256);
        assert_eq!(digests.md5, EMPTY_MD5);
        assert_eq!(digests.bytes_read, 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");

        let err = HashCalculator::hash_file(&missing, HashAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
        assert!(HashCalculator::digest_file(&missing).is_err());
    }
}
