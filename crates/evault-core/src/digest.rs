//! # Content Digests
//!
//! Defines [`ContentDigest`] and [`DigestAlgorithm`] for evidence integrity
//! checking. All digests carry an algorithm tag so stored references remain
//! self-describing if a second algorithm is ever introduced.
//!
//! Digest *computation* lives in `evault-crypto`; this module owns only the
//! value type and its hex round-trip, including the case-insensitive parse
//! the verification path depends on (digests recorded by hand or by the
//! predecessor system appear in both cases).

use serde::{Deserialize, Serialize};

use crate::error::DigestError;

/// The hash algorithm used to compute a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — the sole algorithm for evidence content addressing.
    Sha256,
}

/// A content digest with its algorithm tag.
///
/// The 32-byte digest and its algorithm are always stored together so that
/// verification code can select the correct hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new SHA-256 content digest from raw bytes.
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            bytes,
        }
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a SHA-256 digest from a hex string.
    ///
    /// The parse is case-insensitive: `"AB12..."` and `"ab12..."` denote the
    /// same digest. Whitespace is not trimmed — callers own input hygiene.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::InvalidLength`] unless the input is exactly 64
    /// hex characters, and [`DigestError::InvalidHex`] if any character is
    /// not a hex digit.
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        if hex.len() != 64 {
            return Err(DigestError::InvalidLength {
                expected: 64,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(chunk[0]).ok_or_else(|| DigestError::InvalidHex(hex.to_string()))?;
            let lo = hex_value(chunk[1]).ok_or_else(|| DigestError::InvalidHex(hex.to_string()))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self::sha256(bytes))
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
