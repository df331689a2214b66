//! SHA-256 hex digests for migration checksums.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Read a file and return the SHA-256 hex digest of its contents.
pub fn file_sha256(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(sha256_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_64_hex_chars() {
        let hash = sha256_hex(b"CREATE TABLE t (id int);");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn file_digest_matches_content_digest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("001_init.sql");
        std::fs::write(&path, "SELECT 1;").expect("write");

        assert_eq!(
            file_sha256(&path).expect("hash file"),
            sha256_hex(b"SELECT 1;")
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(file_sha256(&dir.path().join("nope.sql")).is_err());
    }
}
