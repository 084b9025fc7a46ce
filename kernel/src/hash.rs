//! Artifact digests.
//!
//! SHA-256 over the raw artifact bytes, no domain prefix, so the digest
//! matches `sha256sum` of the file. Rendered as `sha256:<hex>`.

use std::fmt;

use sha2::{Digest, Sha256};

const ALGORITHM: &str = "sha256";

/// Digest of an artifact file, as produced by [`artifact_digest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    full: String,
}

impl ContentHash {
    #[must_use]
    pub fn algorithm(&self) -> &str {
        ALGORITHM
    }

    /// Lowercase hex digest without the algorithm prefix.
    #[must_use]
    pub fn hex_digest(&self) -> &str {
        &self.full[ALGORITHM.len() + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

#[must_use]
pub fn artifact_digest(bytes: &[u8]) -> ContentHash {
    let digest = Sha256::digest(bytes);
    ContentHash {
        full: format!("{ALGORITHM}:{}", hex::encode(digest)),
    }
}
