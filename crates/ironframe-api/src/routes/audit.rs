//! # Audit Log API
//!
//! - **GET `/v1/audit`** — the active tenant's entries from the hash-chained
//!   audit log, with a fresh integrity check over the whole chain.
//!
//! Entries carry the entity they concern. A tenant sees only its own,
//! including violations recorded against it. Entries with no entity are
//! never returned here.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use ironframe_cadence::{AuditActionType, AuditEntry, ChainIntegrity};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::ActiveTenant;
use crate::state::AppState;

/// One audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryView {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// `EMAIL_SENT`, `TENANT_ISOLATION_VIOLATION`, or `READ_RECEIPT`.
    #[schema(value_type = String)]
    pub action_type: AuditActionType,
    pub associated_entity: Option<String>,
    pub description: String,
    pub previous_hash: String,
    pub entry_hash: String,
}

impl From<AuditEntry> for AuditEntryView {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id,
            timestamp: e.timestamp,
            action_type: e.action_type,
            associated_entity: e.associated_entity,
            description: e.description,
            previous_hash: e.previous_hash,
            entry_hash: e.entry_hash,
        }
    }
}

/// Audit log with its chain integrity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    /// Slug of the tenant the entries belong to.
    pub tenant: String,
    /// Entries returned to this tenant.
    pub total_entries: usize,
    /// Length of the whole chain that was verified.
    pub chain_entries: usize,
    pub broken_links: usize,
    pub chain_valid: bool,
    pub entries: Vec<AuditEntryView>,
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/audit", get(audit_log))
}

/// GET /v1/audit — The active tenant's audit entries and chain verification.
#[utoipa::path(
    get,
    path = "/v1/audit",
    params(("x-ironframe-tenant" = String, Header, description = "Active tenant")),
    responses(
        (status = 200, description = "Audit entries in append order", body = AuditLogResponse),
        (status = 403, description = "No active tenant", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub(crate) async fn audit_log(
    State(state): State<AppState>,
    tenant: ActiveTenant,
) -> Result<Json<AuditLogResponse>, AppError> {
    let active = tenant.require_active()?;
    let entries: Vec<AuditEntryView> = state
        .sink
        .audit_entries()
        .into_iter()
        .filter(|e| e.tenant() == Some(active))
        .map(Into::into)
        .collect();
    let ChainIntegrity {
        total_entries: chain_entries,
        broken_links,
        chain_valid,
    } = state.sink.verify_audit_chain();
    if !chain_valid {
        tracing::error!(broken_links, "audit chain failed verification");
    }
    Ok(Json(AuditLogResponse {
        tenant: active.slug().to_string(),
        total_entries: entries.len(),
        chain_entries,
        broken_links,
        chain_valid,
        entries,
    }))
}
