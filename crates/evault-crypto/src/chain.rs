//! Hash-chain link computation for the audit trail.
//!
//! Each audit event's hash commits to the previous event's hash plus the
//! event's identifying fields. The first event chains from an all-zero
//! genesis hash. Recomputing the chain detects deletion, reordering, and
//! in-place edits of any chained field.
//!
//! This lives here rather than in the API crate so offline tooling can
//! verify exported chains without pulling in the HTTP stack.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The hash the chain starts from: 64 zero hex digits.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Compute one link of the chain:
/// `SHA-256(previous_hash || event_type || resource_type || resource_id || action)`.
pub fn chain_hash(
    previous_hash: &str,
    event_type: &str,
    resource_type: &str,
    resource_id: Uuid,
    action: &str,
) -> String {
    let input = format!("{previous_hash}{event_type}{resource_type}{resource_id}{action}");
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02x}")).collect()
}
