//! Audit event persistence — the durable half of the hash chain.
//!
//! Chain hashes are assigned in memory by [`AuditLog::append`] under its
//! write lock; this module only stores and reloads committed events. Rows
//! are insert-only.
//!
//! [`AuditLog::append`]: crate::audit::AuditLog::append

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use evault_core::{Role, Timestamp, UserId};

use crate::audit::{AuditEvent, AuditOutcome};

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    event_type: String,
    actor_id: Option<Uuid>,
    actor_role: Option<String>,
    resource_type: String,
    resource_id: Uuid,
    action: String,
    outcome: String,
    metadata: serde_json::Value,
    previous_hash: String,
    event_hash: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_event(self) -> Result<AuditEvent, sqlx::Error> {
        let actor_role = self
            .actor_role
            .as_deref()
            .map(|name| {
                Role::from_name(name).ok_or_else(|| {
                    sqlx::Error::Decode(
                        format!("audit event {}: unknown actor role {name:?}", self.id).into(),
                    )
                })
            })
            .transpose()?;
        let outcome = AuditOutcome::from_name(&self.outcome).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("audit event {}: unknown outcome {:?}", self.id, self.outcome).into(),
            )
        })?;

        Ok(AuditEvent {
            id: self.id,
            event_type: self.event_type,
            actor_id: self.actor_id.map(UserId::from_uuid),
            actor_role,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            action: self.action,
            outcome,
            metadata: self.metadata,
            previous_hash: self.previous_hash,
            event_hash: self.event_hash,
            created_at: Timestamp::from_datetime(self.created_at),
        })
    }
}

/// Persist one committed audit event.
pub async fn insert(pool: &PgPool, event: &AuditEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (id, event_type, actor_id, actor_role, resource_type, \
         resource_id, action, outcome, metadata, previous_hash, event_hash, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(event.id)
    .bind(&event.event_type)
    .bind(event.actor_id.map(|u| *u.as_uuid()))
    .bind(event.actor_role.map(|r| r.as_str()))
    .bind(&event.resource_type)
    .bind(event.resource_id)
    .bind(&event.action)
    .bind(event.outcome.as_str())
    .bind(&event.metadata)
    .bind(&event.previous_hash)
    .bind(&event.event_hash)
    .bind(event.created_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the full audit trail, oldest first, preserving chain order.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let rows: Vec<AuditRow> = sqlx::query_as(
        "SELECT id, event_type, actor_id, actor_role, resource_type, resource_id, \
         action, outcome, metadata, previous_hash, event_hash, created_at \
         FROM audit_events ORDER BY created_at ASC, event_hash ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AuditRow::into_event).collect()
}
