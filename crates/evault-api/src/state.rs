//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! AppState holds the vault's working set:
//! - **Cases** — case records carrying sensitivity classification and
//!   team assignments (what the access gate consumes)
//! - **Evidence** — evidence item aggregates with their custody ledgers
//! - **Audit log** — the hash-chained, append-only audit trail
//!
//! Reads are served from the in-memory stores. When a database pool is
//! attached, every mutation writes through to Postgres and the stores are
//! hydrated from it on startup; when it is absent the API runs in
//! in-memory-only mode.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use evault_access::{CaseAccessView, CaseAssignment, SensitivityClassification, StoredSensitivity};
use evault_core::{CaseId, Timestamp, UserId};
use evault_custody::EvidenceItem;

use crate::audit::AuditLog;
use crate::auth::SecretToken;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points. `parking_lot::RwLock`
/// is non-poisonable — a panicking writer does not permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between read and update. The custody append
    /// and decision paths ride on exactly this.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Remove a record by ID.
    #[allow(dead_code)]
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    #[allow(dead_code)]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Case Records ---------------------------------------------------------------

/// Case record (API-layer representation).
///
/// Holds the sensitivity classification in its stored shape
/// ([`StoredSensitivity`]) plus the membership attributes the access gate
/// consumes. Case *content* (narrative, subjects, charges) lives in the
/// upstream case-management system; this record is the slice the evidence
/// vault needs to decide access and own custody.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseRecord {
    /// Unique case identifier.
    #[schema(value_type = Uuid)]
    pub id: CaseId,
    /// Human-facing case number (e.g. `"2026-CR-00042"`).
    pub case_number: String,
    /// Short case title.
    pub title: String,
    /// Who created the case.
    #[schema(value_type = Uuid)]
    pub created_by: UserId,
    /// The lead investigator, if one is set.
    #[schema(value_type = Option<Uuid>)]
    pub lead_investigator: Option<UserId>,
    /// Users assigned to the case, in any capacity.
    #[schema(value_type = Vec<Object>)]
    pub assignments: Vec<CaseAssignment>,
    /// The case's sensitivity classification, stored shape.
    #[schema(value_type = Object)]
    pub sensitivity: StoredSensitivity,
    /// When the case was registered with the vault.
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    /// When the case record last changed.
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl CaseRecord {
    /// Project the record into the attribute view the access gate consumes.
    pub fn access_view(&self) -> CaseAccessView {
        CaseAccessView {
            sensitivity: SensitivityClassification::from_stored(self.sensitivity.clone()),
            created_by: self.created_by,
            lead_investigator: self.lead_investigator,
            assigned_users: self.assignments.iter().map(|a| a.user_id).collect(),
        }
    }

    /// Whether the given user already appears in the assignment list.
    pub fn is_assigned(&self, user_id: UserId) -> bool {
        self.assignments.iter().any(|a| a.user_id == user_id)
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// `auth_token` is a [`SecretToken`], so the derived `Debug` output redacts
/// the credential.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer secret for authentication.
    /// If `None`, authentication is disabled.
    pub auth_token: Option<SecretToken>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Contains the case and evidence stores, the hash-chained audit log, the
/// optional Postgres pool, and application configuration. Clone-friendly
/// via `Arc` internals in each store.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Case records: sensitivity classification plus team assignments.
    pub cases: Store<CaseRecord>,
    /// Evidence item aggregates with their custody ledgers.
    pub evidence: Store<EvidenceItem>,
    /// The hash-chained audit trail.
    pub audit: AuditLog,
    /// PostgreSQL connection pool for durable persistence.
    /// When `Some`, cases, evidence, and audit events are persisted to
    /// Postgres in addition to the in-memory stores.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no
    /// database pool.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            cases: Store::new(),
            evidence: Store::new(),
            audit: AuditLog::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available. Loads all
    /// persisted cases, evidence items (with their ledgers), and the audit
    /// trail into memory so that read operations remain fast and synchronous.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        // Load cases with their assignments.
        let cases = crate::db::cases::load_all(pool)
            .await
            .map_err(|e| format!("failed to load cases: {e}"))?;
        let case_count = cases.len();
        for record in cases {
            self.cases.insert(*record.id.as_uuid(), record);
        }

        // Load evidence items with their custody ledgers.
        let items = crate::db::evidence::load_all(pool)
            .await
            .map_err(|e| format!("failed to load evidence items: {e}"))?;
        let evidence_count = items.len();
        for record in items {
            let item = EvidenceItem::from_record(record);
            self.evidence.insert(*item.id.as_uuid(), item);
        }

        // Load the audit trail, oldest first, preserving the hash chain.
        let events = crate::db::audit::load_all(pool)
            .await
            .map_err(|e| format!("failed to load audit events: {e}"))?;
        let audit_count = events.len();
        self.audit.hydrate(events);

        tracing::info!(
            cases = case_count,
            evidence_items = evidence_count,
            audit_events = audit_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
