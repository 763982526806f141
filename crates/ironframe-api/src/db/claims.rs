//! Milestone claim persistence.

use ironframe_cadence::Milestone;
use sqlx::PgPool;

use super::parse_text;

/// Atomically claim `(vendor_name, milestone)`.
///
/// Returns `true` only for the caller whose insert created the row; a pair
/// already claimed by any instance returns `false`.
pub async fn insert(
    pool: &PgPool,
    vendor_name: &str,
    milestone: Milestone,
) -> Result<bool, sqlx::Error> {
    let claimed: Option<(String,)> = sqlx::query_as(
        "INSERT INTO milestone_claims (vendor_name, milestone, claimed_at)
         VALUES ($1, $2, NOW())
         ON CONFLICT (vendor_name, milestone) DO NOTHING
         RETURNING vendor_name",
    )
    .bind(vendor_name)
    .bind(milestone.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(claimed.is_some())
}

/// Drop a claim whose dispatch was never recorded.
pub async fn release(
    pool: &PgPool,
    vendor_name: &str,
    milestone: Milestone,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM milestone_claims WHERE vendor_name = $1 AND milestone = $2")
        .bind(vendor_name)
        .bind(milestone.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load every claim.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(String, Milestone)>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT vendor_name, milestone FROM milestone_claims")
            .fetch_all(pool)
            .await?;
    rows.into_iter()
        .map(|(vendor, milestone)| Ok((vendor, parse_text(&milestone)?)))
        .collect()
}
