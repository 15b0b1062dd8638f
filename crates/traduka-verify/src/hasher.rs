use sha2::{Digest, Sha256};

/// Incremental SHA-256 hasher producing lowercase hex digests.
pub struct Sha256Hasher(Sha256);

impl Sha256Hasher {
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize_hex(self) -> String {
        hex::encode(self.0.finalize())
    }

    /// One-shot digest of an in-memory buffer.
    pub fn digest_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn one_shot_digest() {
        assert_eq!(Sha256Hasher::digest_hex(b"hello world"), HELLO_SHA256);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize_hex(), HELLO_SHA256);
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            Sha256Hasher::digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
