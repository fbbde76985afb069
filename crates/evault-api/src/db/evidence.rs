//! Evidence persistence: item rows plus the append-only custody ledger.
//!
//! The `chain_of_custody_entries` table is insert-and-decide only; rows are
//! never deleted. Ledger writes run in a transaction that row-locks the
//! item and re-checks its status, so a database another writer moved is
//! reported as [`LedgerCommit::StatusMoved`] instead of overwritten.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use evault_core::{CaseId, ContentDigest, EntryId, EvidenceId, Timestamp, UserId};
use evault_custody::{
    ApprovalStatus, CustodyAction, CustodyEntry, CustodyStatus, EvidenceCategory, EvidenceRecord,
    Purpose,
};

/// What a ledger write does to the entry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerWrite {
    /// Insert a freshly committed entry.
    Append,
    /// Update an existing entry's approval fields after a decision.
    Decision,
}

/// Outcome of a transactional ledger commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCommit {
    /// The write landed and the item row was updated.
    Committed,
    /// The row-locked status did not match what the caller expected.
    StatusMoved {
        /// The status the database actually held.
        actual: CustodyStatus,
    },
    /// No evidence row exists for the item.
    MissingRow,
}

/// Database row for an evidence item. Entries are loaded separately.
#[derive(sqlx::FromRow)]
struct EvidenceRow {
    id: Uuid,
    case_id: Uuid,
    category: String,
    status: String,
    storage_location: String,
    content_hash: Option<String>,
    retention_label: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EvidenceRow {
    /// Strict decode: unknown category or status names fail the load.
    fn into_record(self, entries: Vec<CustodyEntry>) -> Result<EvidenceRecord, sqlx::Error> {
        let category = EvidenceCategory::from_name(&self.category).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("evidence {}: unknown category {:?}", self.id, self.category).into(),
            )
        })?;
        let status = CustodyStatus::from_name(&self.status).ok_or_else(|| {
            sqlx::Error::Decode(
                format!(
                    "evidence {}: unknown custody status {:?}",
                    self.id, self.status
                )
                .into(),
            )
        })?;
        let content_hash = self
            .content_hash
            .as_deref()
            .map(ContentDigest::from_hex)
            .transpose()
            .map_err(|e| {
                sqlx::Error::Decode(
                    format!("evidence {}: malformed content hash: {e}", self.id).into(),
                )
            })?;

        Ok(EvidenceRecord {
            id: EvidenceId::from_uuid(self.id),
            case_id: CaseId::from_uuid(self.case_id),
            category,
            status,
            storage_location: self.storage_location,
            content_hash,
            retention_label: self.retention_label,
            entries,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    evidence_id: Uuid,
    seq: i64,
    action: String,
    custodian_from: Option<Uuid>,
    custodian_to: Uuid,
    location_from: Option<String>,
    location_to: Option<String>,
    purpose: String,
    signature_ref: Option<String>,
    requires_approval: bool,
    approval_status: String,
    approved_by: Option<Uuid>,
    decided_at: Option<DateTime<Utc>>,
    recorded_by: Uuid,
    recorded_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Result<CustodyEntry, sqlx::Error> {
        let action = CustodyAction::from_name(&self.action).ok_or_else(|| {
            sqlx::Error::Decode(
                format!(
                    "custody entry {} on evidence {}: unknown action {:?}",
                    self.id, self.evidence_id, self.action
                )
                .into(),
            )
        })?;
        let approval_status = ApprovalStatus::from_name(&self.approval_status).ok_or_else(|| {
            sqlx::Error::Decode(
                format!(
                    "custody entry {} on evidence {}: unknown approval status {:?}",
                    self.id, self.evidence_id, self.approval_status
                )
                .into(),
            )
        })?;
        let purpose = Purpose::new(self.purpose).map_err(|e| {
            sqlx::Error::Decode(
                format!("custody entry {}: invalid purpose: {e}", self.id).into(),
            )
        })?;

        Ok(CustodyEntry {
            id: EntryId::from_uuid(self.id),
            seq: self.seq as u64,
            action,
            custodian_from: self.custodian_from.map(UserId::from_uuid),
            custodian_to: UserId::from_uuid(self.custodian_to),
            location_from: self.location_from,
            location_to: self.location_to,
            purpose,
            signature_ref: self.signature_ref,
            requires_approval: self.requires_approval,
            approval_status,
            approved_by: self.approved_by.map(UserId::from_uuid),
            decided_at: self.decided_at.map(Timestamp::from_datetime),
            recorded_by: UserId::from_uuid(self.recorded_by),
            recorded_at: Timestamp::from_datetime(self.recorded_at),
        })
    }
}

const EVIDENCE_COLUMNS: &str = "id, case_id, category, status, storage_location, \
     content_hash, retention_label, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, evidence_id, seq, action, custodian_from, custodian_to, \
     location_from, location_to, purpose, signature_ref, requires_approval, \
     approval_status, approved_by, decided_at, recorded_by, recorded_at";

/// Insert a freshly seized item with its intake entry, atomically.
pub async fn insert(pool: &PgPool, record: &EvidenceRecord) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO evidence_items (id, case_id, category, status, storage_location, \
         content_hash, retention_label, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.id.as_uuid())
    .bind(record.case_id.as_uuid())
    .bind(record.category.as_str())
    .bind(record.status.as_str())
    .bind(&record.storage_location)
    .bind(record.content_hash.as_ref().map(|d| d.to_hex()))
    .bind(&record.retention_label)
    .bind(record.created_at.as_datetime())
    .bind(record.updated_at.as_datetime())
    .execute(&mut *tx)
    .await?;

    for entry in &record.entries {
        insert_entry(&mut tx, record.id.as_uuid(), entry).await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    evidence_id: &Uuid,
    entry: &CustodyEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO chain_of_custody_entries (id, evidence_id, seq, action, \
         custodian_from, custodian_to, location_from, location_to, purpose, \
         signature_ref, requires_approval, approval_status, approved_by, \
         decided_at, recorded_by, recorded_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(entry.id.as_uuid())
    .bind(evidence_id)
    .bind(entry.seq as i64)
    .bind(entry.action.as_str())
    .bind(entry.custodian_from.map(|u| *u.as_uuid()))
    .bind(entry.custodian_to.as_uuid())
    .bind(&entry.location_from)
    .bind(&entry.location_to)
    .bind(entry.purpose.as_str())
    .bind(&entry.signature_ref)
    .bind(entry.requires_approval)
    .bind(entry.approval_status.as_str())
    .bind(entry.approved_by.map(|u| *u.as_uuid()))
    .bind(entry.decided_at.map(|t| *t.as_datetime()))
    .bind(entry.recorded_by.as_uuid())
    .bind(entry.recorded_at.as_datetime())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Commit one ledger mutation: row-lock the item, re-check its status,
/// write the entry, and move the denormalized status.
///
/// The status check mirrors the in-memory compare-and-swap. `expected` is
/// the status the service layer validated against; if the locked row holds
/// something else, the database diverged and nothing is written.
pub async fn commit_entry(
    pool: &PgPool,
    evidence_id: Uuid,
    expected: CustodyStatus,
    entry: &CustodyEntry,
    new_status: CustodyStatus,
    updated_at: Timestamp,
    write: LedgerWrite,
) -> Result<LedgerCommit, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let current: Option<String> =
        sqlx::query_scalar("SELECT status FROM evidence_items WHERE id = $1 FOR UPDATE")
            .bind(evidence_id)
            .fetch_optional(&mut *tx)
            .await?;

    let current = match current {
        Some(status) => status,
        None => {
            tx.rollback().await?;
            return Ok(LedgerCommit::MissingRow);
        }
    };

    if current != expected.as_str() {
        let actual = CustodyStatus::from_name(&current).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("evidence {evidence_id}: unknown custody status {current:?}").into(),
            )
        })?;
        tx.rollback().await?;
        return Ok(LedgerCommit::StatusMoved { actual });
    }

    match write {
        LedgerWrite::Append => {
            insert_entry(&mut tx, &evidence_id, entry).await?;
        }
        LedgerWrite::Decision => {
            sqlx::query(
                "UPDATE chain_of_custody_entries SET approval_status = $2, \
                 approved_by = $3, decided_at = $4 WHERE id = $1",
            )
            .bind(entry.id.as_uuid())
            .bind(entry.approval_status.as_str())
            .bind(entry.approved_by.map(|u| *u.as_uuid()))
            .bind(entry.decided_at.map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query("UPDATE evidence_items SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(evidence_id)
        .bind(new_status.as_str())
        .bind(updated_at.as_datetime())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(LedgerCommit::Committed)
}

/// Load every item with its full ledger for store hydration at startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<EvidenceRecord>, sqlx::Error> {
    let rows: Vec<EvidenceRow> = sqlx::query_as(&format!(
        "SELECT {EVIDENCE_COLUMNS} FROM evidence_items ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    let entry_rows: Vec<EntryRow> = sqlx::query_as(&format!(
        "SELECT {ENTRY_COLUMNS} FROM chain_of_custody_entries ORDER BY evidence_id, seq ASC"
    ))
    .fetch_all(pool)
    .await?;

    let mut grouped: std::collections::HashMap<Uuid, Vec<CustodyEntry>> =
        std::collections::HashMap::new();
    for row in entry_rows {
        let evidence_id = row.evidence_id;
        grouped
            .entry(evidence_id)
            .or_default()
            .push(row.into_entry()?);
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let entries = grouped.remove(&row.id).unwrap_or_default();
        records.push(row.into_record(entries)?);
    }
    Ok(records)
}
