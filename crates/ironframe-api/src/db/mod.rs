//! # Database Persistence Layer
//!
//! Postgres persistence for cadence state via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! persists vendors, outbound messages, milestone claims, and the audit
//! chain, and hydrates the in-memory sink from them on startup so that
//! dispatch idempotence survives restarts. When absent, the API runs
//! in-memory only.
//!
//! `milestone_claims` has primary key `(vendor_name, milestone)`. A claim
//! is inserted with `ON CONFLICT DO NOTHING RETURNING` before the milestone
//! is dispatched, and only the instance that gets the row back sends.
//!
//! Messages, audit entries, and read receipts are written afterwards in
//! batches by [`write_changes`], one transaction per batch.

pub mod audit;
pub mod claims;
pub mod outbound;
pub mod vendors;

use ironframe_cadence::SinkChange;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Dispatch history will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Write a batch of sink changes in order inside one transaction.
///
/// Either the whole batch commits or none of it does.
pub async fn write_changes(pool: &PgPool, changes: &[SinkChange]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for change in changes {
        match change {
            SinkChange::Message(record) => outbound::insert(&mut *tx, record).await?,
            SinkChange::Audit(entry) => audit::insert(&mut *tx, entry).await?,
            SinkChange::Acknowledged { id, read_at } => {
                outbound::acknowledge(&mut *tx, *id, *read_at).await?;
            }
        }
    }
    tx.commit().await
}

/// Serialize a unit-variant enum to its serde string form.
fn enum_to_text<T: Serialize>(value: &T, what: &str) -> Result<String, sqlx::Error> {
    serde_json::to_value(value)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize {what}: {e}")))?
        .as_str()
        .map(String::from)
        .ok_or_else(|| sqlx::Error::Protocol(format!("{what} did not serialize to a string")))
}

/// Parse a unit-variant enum from its serde string form.
fn text_to_enum<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, sqlx::Error> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|e| sqlx::Error::Protocol(format!("invalid {what} {text:?}: {e}")))
}

/// Parse a value with a `FromStr` impl that reports errors as strings.
fn parse_text<T>(text: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = String>,
{
    text.parse().map_err(sqlx::Error::Protocol)
}
