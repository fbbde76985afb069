//! # API Route Modules
//!
//! Route modules for the evidence vault API surface:
//!
//! - `cases` — Case registration, gated fetch/list, the sensitivity
//!   classifier, and team assignment management.
//! - `evidence` — Evidence intake, chain-of-custody appends and decisions,
//!   ledger replay reports, and content integrity verification.
//! - `audit` — Audit trail queries and hash-chain verification for
//!   supervisors and auditors.

use serde::Deserialize;
use utoipa::ToSchema;

pub mod audit;
pub mod cases;
pub mod evidence;

/// Pagination parameters for list endpoints.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (default: 100, max: 1000).
    pub limit: Option<usize>,
    /// Number of items to skip (default: 0).
    pub offset: Option<usize>,
}

impl PaginationParams {
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIMIT: usize = 1000;

    pub(crate) fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub(crate) fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}
