//! Audit chain persistence.
//!
//! Entries are hashed in memory by the sink's audit log and stored here
//! verbatim, so the chain can be re-verified after hydration. `seq` keeps
//! insertion order independent of timestamp resolution; writers must insert
//! in chain order, which [`write_changes`](super::write_changes) does under
//! the state's persist lock.

use chrono::{DateTime, Utc};
use ironframe_cadence::AuditEntry;
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use super::parse_text;

/// Append one audit entry. An entry already stored under the same id is
/// left as is.
pub async fn insert<'e, E>(executor: E, entry: &AuditEntry) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO audit_entries (id, recorded_at, action_type, associated_entity,
         description, previous_hash, entry_hash)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(entry.id)
    .bind(entry.timestamp)
    .bind(entry.action_type.as_str())
    .bind(&entry.associated_entity)
    .bind(&entry.description)
    .bind(&entry.previous_hash)
    .bind(&entry.entry_hash)
    .execute(executor)
    .await?;
    Ok(())
}

/// Load the full chain, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, recorded_at, action_type, associated_entity, description,
         previous_hash, entry_hash
         FROM audit_entries ORDER BY seq",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(AuditRow::into_entry).collect()
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    recorded_at: DateTime<Utc>,
    action_type: String,
    associated_entity: Option<String>,
    description: String,
    previous_hash: String,
    entry_hash: String,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, sqlx::Error> {
        Ok(AuditEntry {
            id: self.id,
            timestamp: self.recorded_at,
            action_type: parse_text(&self.action_type)?,
            associated_entity: self.associated_entity,
            description: self.description,
            previous_hash: self.previous_hash,
            entry_hash: self.entry_hash,
        })
    }
}
