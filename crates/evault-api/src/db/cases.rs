//! Case persistence: records, sensitivity classifications, assignments.
//!
//! Listing is the one read path that goes to Postgres while a pool is
//! attached: [`list_visible`] renders a [`CaseAccessFilter`] into a single
//! `WHERE` clause so visibility costs one query, never one gate call per
//! row. Everything else is write-through from the in-memory store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use evault_access::{
    AccessRestrictions, AssignmentRole, CaseAccessFilter, CaseAssignment, SensitivityLevel,
    StoredSensitivity,
};
use evault_core::{CaseId, Timestamp, UserId};

use crate::state::CaseRecord;

/// Database row for a case. Private to this module; the rest of the
/// crate sees [`CaseRecord`].
#[derive(sqlx::FromRow)]
struct CaseRow {
    id: Uuid,
    case_number: String,
    title: String,
    created_by: Uuid,
    lead_investigator: Option<Uuid>,
    sensitivity_level: String,
    sensitivity_restrictions: serde_json::Value,
    sensitivity_reason: Option<String>,
    sensitivity_marked_by: Option<Uuid>,
    sensitivity_marked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaseRow {
    /// Strict decode: a row carrying a level or restriction set this build
    /// does not recognize fails the load rather than degrading silently.
    fn into_record(self, assignments: Vec<CaseAssignment>) -> Result<CaseRecord, sqlx::Error> {
        let level = SensitivityLevel::from_name(&self.sensitivity_level).ok_or_else(|| {
            sqlx::Error::Decode(
                format!(
                    "case {}: unknown sensitivity level {:?}",
                    self.id, self.sensitivity_level
                )
                .into(),
            )
        })?;
        let restrictions: AccessRestrictions =
            serde_json::from_value(self.sensitivity_restrictions).map_err(|e| {
                sqlx::Error::Decode(
                    format!("case {}: malformed access restrictions: {e}", self.id).into(),
                )
            })?;

        Ok(CaseRecord {
            id: CaseId::from_uuid(self.id),
            case_number: self.case_number,
            title: self.title,
            created_by: UserId::from_uuid(self.created_by),
            lead_investigator: self.lead_investigator.map(UserId::from_uuid),
            assignments,
            sensitivity: StoredSensitivity {
                level,
                restrictions,
                reason: self.sensitivity_reason,
                marked_by: self.sensitivity_marked_by.map(UserId::from_uuid),
                marked_at: self.sensitivity_marked_at.map(Timestamp::from_datetime),
            },
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    case_id: Uuid,
    user_id: Uuid,
    role: String,
    assigned_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn into_assignment(self) -> Result<CaseAssignment, sqlx::Error> {
        let role = AssignmentRole::from_name(&self.role).ok_or_else(|| {
            sqlx::Error::Decode(
                format!(
                    "assignment on case {}: unknown role {:?}",
                    self.case_id, self.role
                )
                .into(),
            )
        })?;
        Ok(CaseAssignment {
            case_id: CaseId::from_uuid(self.case_id),
            user_id: UserId::from_uuid(self.user_id),
            role,
            assigned_at: Timestamp::from_datetime(self.assigned_at),
        })
    }
}

fn restrictions_json(restrictions: &AccessRestrictions) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(restrictions).map_err(|e| {
        sqlx::Error::Protocol(format!("failed to serialize access restrictions: {e}"))
    })
}

const CASE_COLUMNS: &str = "id, case_number, title, created_by, lead_investigator, \
     sensitivity_level, sensitivity_restrictions, sensitivity_reason, \
     sensitivity_marked_by, sensitivity_marked_at, created_at, updated_at";

/// Insert a new case record.
pub async fn insert(pool: &PgPool, record: &CaseRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cases (id, case_number, title, created_by, lead_investigator, \
         sensitivity_level, sensitivity_restrictions, sensitivity_reason, \
         sensitivity_marked_by, sensitivity_marked_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(record.id.as_uuid())
    .bind(&record.case_number)
    .bind(&record.title)
    .bind(record.created_by.as_uuid())
    .bind(record.lead_investigator.map(|u| *u.as_uuid()))
    .bind(record.sensitivity.level.as_str())
    .bind(restrictions_json(&record.sensitivity.restrictions)?)
    .bind(&record.sensitivity.reason)
    .bind(record.sensitivity.marked_by.map(|u| *u.as_uuid()))
    .bind(record.sensitivity.marked_at.map(|t| *t.as_datetime()))
    .bind(record.created_at.as_datetime())
    .bind(record.updated_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(())
}

/// Update a case's sensitivity classification.
///
/// Returns `true` if the row existed.
pub async fn update_sensitivity(
    pool: &PgPool,
    case_id: Uuid,
    sensitivity: &StoredSensitivity,
    updated_at: Timestamp,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE cases SET sensitivity_level = $2, sensitivity_restrictions = $3, \
         sensitivity_reason = $4, sensitivity_marked_by = $5, sensitivity_marked_at = $6, \
         updated_at = $7 WHERE id = $1",
    )
    .bind(case_id)
    .bind(sensitivity.level.as_str())
    .bind(restrictions_json(&sensitivity.restrictions)?)
    .bind(&sensitivity.reason)
    .bind(sensitivity.marked_by.map(|u| *u.as_uuid()))
    .bind(sensitivity.marked_at.map(|t| *t.as_datetime()))
    .bind(updated_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert an assignment and touch the case's `updated_at`, atomically.
pub async fn insert_assignment(
    pool: &PgPool,
    assignment: &CaseAssignment,
    updated_at: Timestamp,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO case_assignments (case_id, user_id, role, assigned_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(assignment.case_id.as_uuid())
    .bind(assignment.user_id.as_uuid())
    .bind(assignment.role.as_str())
    .bind(assignment.assigned_at.as_datetime())
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE cases SET updated_at = $2 WHERE id = $1")
        .bind(assignment.case_id.as_uuid())
        .bind(updated_at.as_datetime())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Delete an assignment and touch the case's `updated_at`, atomically.
///
/// Returns `true` if the assignment existed.
pub async fn delete_assignment(
    pool: &PgPool,
    case_id: Uuid,
    user_id: UserId,
    updated_at: Timestamp,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM case_assignments WHERE case_id = $1 AND user_id = $2")
        .bind(case_id)
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE cases SET updated_at = $2 WHERE id = $1")
        .bind(case_id)
        .bind(updated_at.as_datetime())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// List the cases a subject may see, newest first.
///
/// The filter's clauses map one-to-one onto the `WHERE` disjuncts:
/// levels visible wholesale, levels granted through team membership
/// (creator, lead, or assignment), and levels granted through the user
/// and role allow-lists stored in the restrictions JSONB.
pub async fn list_visible(
    pool: &PgPool,
    filter: &CaseAccessFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<CaseRecord>, sqlx::Error> {
    let rows: Vec<CaseRow> = match filter {
        CaseAccessFilter::Unrestricted => {
            sqlx::query_as(&format!(
                "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        CaseAccessFilter::Scoped(clauses) => {
            let as_names = |levels: &std::collections::BTreeSet<SensitivityLevel>| {
                levels
                    .iter()
                    .map(|l| l.as_str().to_string())
                    .collect::<Vec<String>>()
            };
            sqlx::query_as(&format!(
                "SELECT {CASE_COLUMNS} FROM cases \
                 WHERE sensitivity_level = ANY($1) \
                    OR (sensitivity_level = ANY($2) AND (created_by = $3 \
                        OR lead_investigator = $3 \
                        OR EXISTS (SELECT 1 FROM case_assignments a \
                                   WHERE a.case_id = cases.id AND a.user_id = $3))) \
                    OR (sensitivity_level = ANY($4) \
                        AND sensitivity_restrictions->'allowed_users' ? $5) \
                    OR (sensitivity_level = ANY($6) \
                        AND sensitivity_restrictions->'allowed_roles' ? $7) \
                 ORDER BY created_at DESC LIMIT $8 OFFSET $9"
            ))
            .bind(as_names(&clauses.plain_levels))
            .bind(as_names(&clauses.team_levels))
            .bind(clauses.user_id.as_uuid())
            .bind(as_names(&clauses.allow_user_levels))
            .bind(clauses.user_id.as_uuid().to_string())
            .bind(as_names(&clauses.allow_role_levels))
            .bind(clauses.role.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut grouped = assignments_for(pool, &ids).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let assignments = grouped.remove(&row.id).unwrap_or_default();
        records.push(row.into_record(assignments)?);
    }
    Ok(records)
}

/// Load every case for store hydration at startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<CaseRecord>, sqlx::Error> {
    let rows: Vec<CaseRow> = sqlx::query_as(&format!(
        "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut grouped = assignments_for(pool, &ids).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let assignments = grouped.remove(&row.id).unwrap_or_default();
        records.push(row.into_record(assignments)?);
    }
    Ok(records)
}

/// Fetch assignments for a set of cases, grouped by case.
async fn assignments_for(
    pool: &PgPool,
    case_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<CaseAssignment>>, sqlx::Error> {
    if case_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<AssignmentRow> = sqlx::query_as(
        "SELECT case_id, user_id, role, assigned_at FROM case_assignments \
         WHERE case_id = ANY($1) ORDER BY assigned_at ASC",
    )
    .bind(case_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<CaseAssignment>> = HashMap::new();
    for row in rows {
        let case_id = row.case_id;
        grouped
            .entry(case_id)
            .or_default()
            .push(row.into_assignment()?);
    }
    Ok(grouped)
}
