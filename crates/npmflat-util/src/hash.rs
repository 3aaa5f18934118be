use sha2::{Digest, Sha256};

/// Incremental SHA-256 digest producing lowercase hex.
///
/// Feed it chunks as they arrive from a stream, then call [`finish`](Self::finish).
#[derive(Clone, Default)]
pub struct Sha256Hex {
    hasher: Sha256,
    len: u64,
}

impl Sha256Hex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb another chunk of content.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Number of bytes absorbed so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the hasher, returning the 64-character lowercase hex digest.
    #[must_use]
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Compute the SHA-256 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known SHA-256 of "hello world"
    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(sha256_bytes(b"hello world"), HELLO_WORLD);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Sha256Hex::new();
        hasher.update(b"hello");
        hasher.update(b" ");
        hasher.update(b"world");
        assert_eq!(hasher.len(), 11);
        assert_eq!(hasher.finish(), HELLO_WORLD);
    }

    #[test]
    fn test_empty_digest() {
        let hasher = Sha256Hex::new();
        assert!(hasher.is_empty());
        assert_eq!(
            hasher.finish(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
