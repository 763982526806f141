//! Outbound message persistence.

use chrono::{DateTime, Utc};
use ironframe_cadence::{OutboundMessageRecord, ReadStatus};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use super::parse_text;

/// Insert an outbound message. Re-inserting the same id is a no-op, so a
/// retried batch does not fail on rows an earlier attempt committed.
pub async fn insert<'e, E>(executor: E, record: &OutboundMessageRecord) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO outbound_messages (id, sent_at, recipient_email, recipient_title,
         subject, body, channel, priority, require_read_receipt, vendor_name,
         associated_entity, cadence_milestone, read_status, read_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(record.id)
    .bind(record.sent_at)
    .bind(&record.recipient_email)
    .bind(&record.recipient_title)
    .bind(&record.subject)
    .bind(&record.body)
    .bind(record.channel.as_str())
    .bind(record.priority.as_str())
    .bind(record.require_read_receipt)
    .bind(&record.vendor_name)
    .bind(&record.associated_entity)
    .bind(record.cadence_milestone.map(|m| m.as_str()))
    .bind(record.read_status.as_str())
    .bind(record.read_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark a message acknowledged if it is still pending.
pub async fn acknowledge<'e, E>(
    executor: E,
    id: Uuid,
    read_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE outbound_messages SET read_status = $1, read_at = $2
         WHERE id = $3 AND read_status = $4",
    )
    .bind(ReadStatus::Acknowledged.as_str())
    .bind(read_at)
    .bind(id)
    .bind(ReadStatus::Pending.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load every message, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<OutboundMessageRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OutboundRow>(
        "SELECT id, sent_at, recipient_email, recipient_title, subject, body, channel,
         priority, require_read_receipt, vendor_name, associated_entity, cadence_milestone,
         read_status, read_at
         FROM outbound_messages ORDER BY sent_at, id",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(OutboundRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct OutboundRow {
    id: Uuid,
    sent_at: DateTime<Utc>,
    recipient_email: String,
    recipient_title: String,
    subject: String,
    body: String,
    channel: String,
    priority: String,
    require_read_receipt: bool,
    vendor_name: Option<String>,
    associated_entity: Option<String>,
    cadence_milestone: Option<String>,
    read_status: String,
    read_at: Option<DateTime<Utc>>,
}

impl OutboundRow {
    fn into_record(self) -> Result<OutboundMessageRecord, sqlx::Error> {
        Ok(OutboundMessageRecord {
            id: self.id,
            sent_at: self.sent_at,
            recipient_email: self.recipient_email,
            recipient_title: self.recipient_title,
            subject: self.subject,
            body: self.body,
            channel: parse_text(&self.channel)?,
            priority: parse_text(&self.priority)?,
            require_read_receipt: self.require_read_receipt,
            vendor_name: self.vendor_name,
            associated_entity: self.associated_entity,
            cadence_milestone: self
                .cadence_milestone
                .as_deref()
                .map(parse_text)
                .transpose()?,
            read_status: parse_text(&self.read_status)?,
            read_at: self.read_at,
        })
    }
}
