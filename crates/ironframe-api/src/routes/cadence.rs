//! # Cadence API
//!
//! Evaluation trigger and the outbound message log, scoped to the caller's
//! active tenant (`x-ironframe-tenant`). Without one every route is 403.
//!
//! - **POST `/v1/cadence/evaluate`** — evaluate the tenant's vendors now
//! - **GET `/v1/cadence/outbound`** — the tenant's outbound messages
//! - **POST `/v1/cadence/outbound/{id}/ack`** — record a read receipt; a
//!   message owned by another tenant is a 403 and an audited violation
//! - **GET `/v1/cadence/unresponsive`** — the tenant's vendor requests unread
//!   after 48 hours

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use ironframe_cadence::{
    CadenceDispatchEvent, CadenceSkip, Channel, Milestone, OutboundMessageRecord, Priority,
    ReadStatus,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::ActiveTenant;
use crate::routes::vendors::VendorView;
use crate::scheduler::run_evaluation;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of one cadence evaluation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EvaluationResponse {
    pub evaluated_at: DateTime<Utc>,
    /// Vendors with refreshed cadence buckets.
    pub vendors: Vec<VendorView>,
    /// Messages dispatched in this pass.
    #[schema(value_type = Vec<Object>)]
    pub dispatched_events: Vec<CadenceDispatchEvent>,
    /// Vendors or notifications excluded from this pass, with the reason.
    #[schema(value_type = Vec<Object>)]
    pub skipped: Vec<CadenceSkip>,
}

/// One outbound message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutboundMessageView {
    pub id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub recipient_email: String,
    pub recipient_title: String,
    pub subject: String,
    pub body: String,
    /// `CADENCE_90_VENDOR`, `VENDOR_DOC_REQUEST`, or `CADENCE_30_STAKEHOLDER`.
    #[schema(value_type = String)]
    pub channel: Channel,
    #[schema(value_type = String)]
    pub priority: Priority,
    pub require_read_receipt: bool,
    pub vendor_name: Option<String>,
    pub associated_entity: Option<String>,
    /// `90`, `60`, or `30`.
    #[schema(value_type = Option<String>)]
    pub cadence_milestone: Option<Milestone>,
    /// `PENDING` or `ACKNOWLEDGED`.
    #[schema(value_type = String)]
    pub read_status: ReadStatus,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<OutboundMessageRecord> for OutboundMessageView {
    fn from(m: OutboundMessageRecord) -> Self {
        Self {
            id: m.id,
            sent_at: m.sent_at,
            recipient_email: m.recipient_email,
            recipient_title: m.recipient_title,
            subject: m.subject,
            body: m.body,
            channel: m.channel,
            priority: m.priority,
            require_read_receipt: m.require_read_receipt,
            vendor_name: m.vendor_name,
            associated_entity: m.associated_entity,
            cadence_milestone: m.cadence_milestone,
            read_status: m.read_status,
            read_at: m.read_at,
        }
    }
}

/// A list of outbound messages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OutboundListResponse {
    pub count: usize,
    pub messages: Vec<OutboundMessageView>,
}

impl From<Vec<OutboundMessageRecord>> for OutboundListResponse {
    fn from(records: Vec<OutboundMessageRecord>) -> Self {
        let messages: Vec<OutboundMessageView> = records.into_iter().map(Into::into).collect();
        Self {
            count: messages.len(),
            messages,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the cadence router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cadence/evaluate", post(evaluate))
        .route("/v1/cadence/outbound", get(list_outbound))
        .route("/v1/cadence/outbound/{id}/ack", post(acknowledge))
        .route("/v1/cadence/unresponsive", get(list_unresponsive))
}

/// Keep the messages whose vendor belongs to the active tenant.
fn owned_by(
    messages: Vec<OutboundMessageRecord>,
    tenant: &ActiveTenant,
) -> Vec<OutboundMessageRecord> {
    messages
        .into_iter()
        .filter(|m| m.tenant().is_some_and(|owner| tenant.0.can_access(owner)))
        .collect()
}

/// POST /v1/cadence/evaluate — Evaluate the active tenant's vendors now.
#[utoipa::path(
    post,
    path = "/v1/cadence/evaluate",
    params(("x-ironframe-tenant" = String, Header, description = "Active tenant")),
    responses(
        (status = 200, description = "Evaluation result", body = EvaluationResponse),
        (status = 403, description = "No active tenant", body = crate::error::ErrorBody),
        (status = 500, description = "Sink or database failure", body = crate::error::ErrorBody),
    ),
    tag = "cadence"
)]
pub(crate) async fn evaluate(
    State(state): State<AppState>,
    tenant: ActiveTenant,
) -> Result<Json<EvaluationResponse>, AppError> {
    let active = tenant.require_active()?;
    let now = Utc::now();
    let evaluation = run_evaluation(&state, now, Some(active)).await?;
    Ok(Json(EvaluationResponse {
        evaluated_at: now,
        vendors: evaluation.vendors.into_iter().map(Into::into).collect(),
        dispatched_events: evaluation.dispatched_events,
        skipped: evaluation.skipped,
    }))
}

/// GET /v1/cadence/outbound — List the active tenant's outbound messages.
#[utoipa::path(
    get,
    path = "/v1/cadence/outbound",
    params(("x-ironframe-tenant" = String, Header, description = "Active tenant")),
    responses(
        (status = 200, description = "Outbound messages in dispatch order", body = OutboundListResponse),
        (status = 403, description = "No active tenant", body = crate::error::ErrorBody),
    ),
    tag = "cadence"
)]
pub(crate) async fn list_outbound(
    State(state): State<AppState>,
    tenant: ActiveTenant,
) -> Result<Json<OutboundListResponse>, AppError> {
    tenant.require_active()?;
    Ok(Json(owned_by(state.sink.outbound(), &tenant).into()))
}

/// POST /v1/cadence/outbound/{id}/ack — Record a read receipt.
#[utoipa::path(
    post,
    path = "/v1/cadence/outbound/{id}/ack",
    params(
        ("id" = Uuid, Path, description = "Outbound message ID"),
        ("x-ironframe-tenant" = String, Header, description = "Active tenant"),
    ),
    responses(
        (status = 200, description = "Acknowledged message", body = OutboundMessageView),
        (status = 403, description = "Message belongs to another tenant", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown message", body = crate::error::ErrorBody),
    ),
    tag = "cadence"
)]
pub(crate) async fn acknowledge(
    State(state): State<AppState>,
    ActiveTenant(ctx): ActiveTenant,
    Path(id): Path<Uuid>,
) -> Result<Json<OutboundMessageView>, AppError> {
    let message = state
        .sink
        .message(id)
        .ok_or_else(|| AppError::NotFound(format!("outbound message {id}")))?;
    let Some(owner) = message.tenant() else {
        tracing::warn!(message_id = %id, "read receipt for a message with no owning tenant");
        return Err(AppError::TenantAccessDenied {
            active: ctx.active().map(|k| k.slug()).unwrap_or("none").to_string(),
            target: "unassigned".to_string(),
        });
    };
    state.require_tenant(&ctx, owner).await?;

    let message = state.sink.acknowledge(id, Utc::now())?;
    state.persist_changes().await?;
    tracing::info!(message_id = %id, recipient = %message.recipient_email, "read receipt recorded");
    Ok(Json(message.into()))
}

/// GET /v1/cadence/unresponsive — The active tenant's vendor requests still
/// unread after 48 hours.
#[utoipa::path(
    get,
    path = "/v1/cadence/unresponsive",
    params(("x-ironframe-tenant" = String, Header, description = "Active tenant")),
    responses(
        (status = 200, description = "Unresponsive vendor document requests", body = OutboundListResponse),
        (status = 403, description = "No active tenant", body = crate::error::ErrorBody),
    ),
    tag = "cadence"
)]
pub(crate) async fn list_unresponsive(
    State(state): State<AppState>,
    tenant: ActiveTenant,
) -> Result<Json<OutboundListResponse>, AppError> {
    tenant.require_active()?;
    let unresponsive = state.sink.unresponsive_vendor_requests(Utc::now());
    Ok(Json(owned_by(unresponsive, &tenant).into()))
}
