//! Content fingerprints for determinism checks.
//!
//! Uses BLAKE3 for all hashing operations. Two documents with the same
//! fingerprint are bit-identical in state and raster.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BLAKE3 hash (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental fingerprint over several byte sections.
///
/// Each section is length-prefixed so that moving bytes between sections
/// changes the result.
pub struct Fingerprinter {
    hasher: blake3::Hasher,
}

impl Fingerprinter {
    /// Start a new fingerprint
    #[must_use]
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    /// Feed one section
    pub fn section(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Finish and return the hash
    #[must_use]
    pub fn finish(&self) -> Hash {
        Hash(*self.hasher.finalize().as_bytes())
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex() {
        let h = Fingerprinter::new().section(b"mask").finish();
        assert_eq!(h.to_hex().len(), 64);
        assert_eq!(h.to_string(), h.to_hex());
        assert_eq!(hex::decode(h.to_hex()).unwrap(), h.as_bytes().to_vec());
    }

    #[test]
    fn test_fingerprinter_sections_are_delimited() {
        let a = Fingerprinter::new().section(b"ab").section(b"c").finish();
        let b = Fingerprinter::new().section(b"a").section(b"bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprinter_deterministic() {
        let a = Fingerprinter::new().section(b"state").section(&[1, 2, 3]).finish();
        let b = Fingerprinter::new().section(b"state").section(&[1, 2, 3]).finish();
        assert_eq!(a, b);
    }
}
