//! # Streaming SHA-256 Digests
//!
//! Computes and verifies content-addressed SHA-256 digests for evidence
//! content. Digests are computed by streaming: forensic disk images are
//! routinely larger than available memory, so the byte source is consumed
//! in fixed-size chunks and never buffered whole.
//!
//! ## Integrity Invariant
//!
//! Verification never mutates stored state and never re-writes the stored
//! digest. A mismatch between the stored digest and the recomputed one is
//! an ordinary result (`Ok(false)`), not an error; only an unreadable byte
//! source is an error. Digest comparison is constant-time.
//!
//! ## Transaction Boundary
//!
//! Hashing a large file is the one legitimately long-running operation in
//! the stack. It must happen outside any database transaction: callers
//! compute the digest first and hand the finished value to the commit path.

use std::io::Read;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use evault_core::ContentDigest;

use crate::error::IntegrityError;

/// Read-buffer size for streaming digest computation.
const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Sha256Stream
// ---------------------------------------------------------------------------

/// An incremental SHA-256 accumulator.
///
/// Bytes may be fed in any chunking; the finished digest depends only on
/// the concatenated input sequence.
#[derive(Debug, Default)]
pub struct Sha256Stream {
    hasher: Sha256,
}

impl Sha256Stream {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb a chunk of input.
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Consume the accumulator and return the finished digest.
    pub fn finalize(self) -> ContentDigest {
        ContentDigest::sha256(self.hasher.finalize().into())
    }
}

// ---------------------------------------------------------------------------
// Digest computation & verification
// ---------------------------------------------------------------------------

/// Compute the SHA-256 content digest of a byte stream.
///
/// The reader is consumed in 64 KiB chunks, so inputs larger than available
/// memory are supported. Deterministic and side-effect-free.
///
/// Returns [`IntegrityError::StorageUnavailable`] if the source cannot be
/// read. Interrupted reads are retried; every other read failure aborts.
pub fn compute_digest(mut reader: impl Read) -> Result<ContentDigest, IntegrityError> {
    let mut stream = Sha256Stream::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(IntegrityError::StorageUnavailable(e)),
        };
        stream.update(&buf[..n]);
    }
    Ok(stream.finalize())
}

/// Verify a byte stream against a previously stored hex digest.
///
/// The stored digest is parsed case-insensitively. A malformed stored
/// digest returns `Ok(false)` without touching the byte source; a mismatch
/// returns `Ok(false)` as well — verification answers a question, it does
/// not fail the caller. The comparison of the raw 32-byte digests is
/// constant-time to prevent a timing side-channel on digest checking.
///
/// Returns [`IntegrityError::StorageUnavailable`] only when the byte
/// source itself cannot be read.
pub fn verify(stored: &str, reader: impl Read) -> Result<bool, IntegrityError> {
    let stored = match ContentDigest::from_hex(stored) {
        Ok(digest) => digest,
        Err(_) => return Ok(false),
    };
    let recomputed = compute_digest(reader)?;
    Ok(bool::from(recomputed.bytes.ct_eq(&stored.bytes)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
