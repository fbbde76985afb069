//! # Audit Trail — Immutable Hash Chain
//!
//! Every security-relevant mutation (evidence registration, custody append,
//! approval decision, sensitivity change) appends an audit event with a
//! SHA-256 hash chaining to the previous event. Denied attempts are recorded
//! the same way as successes — an audit trail that only shows what worked
//! is half a trail.
//!
//! The chain starts at an all-zero genesis hash. Each event hash commits to
//! the previous hash plus the event's identifying fields, so deleting or
//! reordering an event breaks every link after it. [`AuditLog::verify_chain`]
//! recomputes the chain and reports the breaks.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use evault_core::{Role, Timestamp, UserId};

pub use evault_crypto::{chain_hash, GENESIS_HASH};

/// Whether the audited operation was carried out or refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    /// The operation committed.
    Success,
    /// The operation was denied (authorization or ledger refusal).
    Denied,
}

impl AuditOutcome {
    /// Return the string representation of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Denied => "DENIED",
        }
    }

    /// Parse an outcome from its wire spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUCCESS" => Some(Self::Success),
            "DENIED" => Some(Self::Denied),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed audit event.
///
/// Write-once: events are never edited or removed. `previous_hash` and
/// `event_hash` are assigned by [`AuditLog::append`] under the same lock
/// that orders the chain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Dotted event classification (e.g. `"custody.appended"`).
    pub event_type: String,
    /// The acting user, if the event has one.
    #[schema(value_type = Option<Uuid>)]
    pub actor_id: Option<UserId>,
    /// The acting user's role at the time.
    #[schema(value_type = Option<String>)]
    pub actor_role: Option<Role>,
    /// The kind of resource acted on (`"case"` or `"evidence"`).
    pub resource_type: String,
    /// The resource acted on.
    pub resource_id: Uuid,
    /// The recorded action (custody action name, decision, level, ...).
    pub action: String,
    /// Whether the operation committed or was denied.
    pub outcome: AuditOutcome,
    /// Free-form context for reviewers.
    pub metadata: serde_json::Value,
    /// The previous event's hash, or the genesis hash for the first event.
    pub previous_hash: String,
    /// SHA-256 over the previous hash and this event's identifying fields.
    pub event_hash: String,
    /// When the event was committed.
    #[schema(value_type = String)]
    pub created_at: Timestamp,
}

/// An audit event to be appended, before the chain fields are assigned.
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    /// Dotted event classification.
    pub event_type: String,
    /// The acting user, if the event has one.
    pub actor_id: Option<UserId>,
    /// The acting user's role at the time.
    pub actor_role: Option<Role>,
    /// The kind of resource acted on.
    pub resource_type: String,
    /// The resource acted on.
    pub resource_id: Uuid,
    /// The recorded action.
    pub action: String,
    /// Whether the operation committed or was denied.
    pub outcome: AuditOutcome,
    /// Free-form context for reviewers.
    pub metadata: serde_json::Value,
}

/// Filters for querying the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Only events of this classification.
    pub event_type: Option<String>,
    /// Only events on this kind of resource.
    pub resource_type: Option<String>,
    /// Only events on this resource.
    pub resource_id: Option<Uuid>,
    /// Only events with this outcome.
    pub outcome: Option<AuditOutcome>,
}

/// Result of verifying the audit chain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainIntegrityReport {
    /// Number of events checked.
    pub total_events: usize,
    /// Number of events whose linkage or recomputed hash failed.
    pub broken_links: usize,
    /// Whether the whole chain verified.
    pub chain_valid: bool,
}

/// The in-memory, hash-chained audit log.
///
/// Appends run under a single write lock so chain order is total. When a
/// database pool is attached the service layer writes each event through
/// with the hashes already assigned, keeping the persisted chain identical
/// to the in-memory one.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl AuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning its chain fields.
    ///
    /// Returns the committed event, hashes included, so callers can persist
    /// exactly what the chain recorded.
    pub fn append(&self, event: NewAuditEvent) -> AuditEvent {
        let mut guard = self.events.write();
        let previous_hash = guard
            .last()
            .map(|e| e.event_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let event_hash = chain_hash(
            &previous_hash,
            &event.event_type,
            &event.resource_type,
            event.resource_id,
            &event.action,
        );
        let committed = AuditEvent {
            id: Uuid::new_v4(),
            event_type: event.event_type,
            actor_id: event.actor_id,
            actor_role: event.actor_role,
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            action: event.action,
            outcome: event.outcome,
            metadata: event.metadata,
            previous_hash,
            event_hash,
            created_at: Timestamp::now(),
        };
        guard.push(committed.clone());
        committed
    }

    /// All events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Events matching the query, oldest first.
    pub fn query(&self, query: &AuditQuery) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| {
                query
                    .event_type
                    .as_ref()
                    .map_or(true, |t| &e.event_type == t)
                    && query
                        .resource_type
                        .as_ref()
                        .map_or(true, |t| &e.resource_type == t)
                    && query.resource_id.map_or(true, |id| e.resource_id == id)
                    && query.outcome.map_or(true, |o| e.outcome == o)
            })
            .cloned()
            .collect()
    }

    /// Events for one resource, oldest first.
    pub fn events_for_resource(&self, resource_type: &str, resource_id: Uuid) -> Vec<AuditEvent> {
        self.query(&AuditQuery {
            resource_type: Some(resource_type.to_string()),
            resource_id: Some(resource_id),
            ..AuditQuery::default()
        })
    }

    /// Verify the chain: every event must link to its predecessor and its
    /// hash must recompute from its own fields.
    pub fn verify_chain(&self) -> ChainIntegrityReport {
        let guard = self.events.read();
        let mut broken_links = 0;
        let mut expected_prev = GENESIS_HASH.to_string();

        for event in guard.iter() {
            let recomputed = chain_hash(
                &event.previous_hash,
                &event.event_type,
                &event.resource_type,
                event.resource_id,
                &event.action,
            );
            if event.previous_hash != expected_prev || event.event_hash != recomputed {
                broken_links += 1;
            }
            expected_prev = event.event_hash.clone();
        }

        ChainIntegrityReport {
            total_events: guard.len(),
            broken_links,
            chain_valid: broken_links == 0,
        }
    }

    /// Replace the log's contents with events loaded from the database.
    ///
    /// Rows must arrive oldest first; the chain fields are trusted
    /// as-recorded and checked by [`verify_chain`](Self::verify_chain).
    pub fn hydrate(&self, events: Vec<AuditEvent>) {
        *self.events.write() = events;
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
