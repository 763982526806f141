//! # Tenant-Scoped API
//!
//! Every route here names a tenant in its path and passes through the
//! isolation guard before any data is read:
//!
//! - **GET `/v1/tenants/{tenant}/exposure`** — financial exposure and risk level
//! - **GET `/v1/tenants/{tenant}/score`** — baseline entity security score
//! - **GET `/v1/tenants/{tenant}/vendors`** — the tenant's vendors
//!
//! The portfolio score (`/v1/portfolio/score`) names no tenant and is
//! therefore not guarded.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use ironframe_core::TenantKey;
use ironframe_risk::{aggregate_entities, tenant_risk_posture, EntityData, RiskLevel};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::ActiveTenant;
use crate::routes::vendors::VendorView;
use crate::routes::risk::EntityScoreResponse;
use crate::state::AppState;

/// Financial exposure for one tenant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantExposureResponse {
    pub tenant: String,
    pub tenant_id: Uuid,
    /// Annualized loss exposure in cents.
    pub exposure_cents: u64,
    /// Exposure formatted as dollars.
    pub exposure_display: String,
    /// Breach liability threshold in cents.
    pub threshold_cents: u64,
    #[schema(value_type = String)]
    pub level: RiskLevel,
}

/// Entity score for one named entity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NamedEntityScore {
    pub entity_name: String,
    #[serde(flatten)]
    pub result: EntityScoreResponse,
}

/// Vendors owned by one tenant.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantVendorsResponse {
    pub tenant: String,
    pub count: usize,
    pub vendors: Vec<VendorView>,
}

/// Build the tenant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/tenants/{tenant}/exposure", get(tenant_exposure))
        .route("/v1/tenants/{tenant}/score", get(tenant_score))
        .route("/v1/tenants/{tenant}/vendors", get(tenant_vendors))
        .route("/v1/portfolio/score", get(portfolio_score))
}

fn parse_tenant(raw: &str) -> Result<TenantKey, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("tenant {raw:?}")))
}

/// GET /v1/tenants/{tenant}/exposure — Guarded financial exposure.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant}/exposure",
    params(("tenant" = String, Path, description = "Tenant slug or identifier")),
    responses(
        (status = 200, description = "Exposure and risk level", body = TenantExposureResponse),
        (status = 403, description = "Tenant isolation violation", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown tenant", body = crate::error::ErrorBody),
    ),
    tag = "tenants"
)]
pub(crate) async fn tenant_exposure(
    State(state): State<AppState>,
    ActiveTenant(ctx): ActiveTenant,
    Path(tenant): Path<String>,
) -> Result<Json<TenantExposureResponse>, AppError> {
    let tenant = parse_tenant(&tenant)?;
    state.require_tenant(&ctx, tenant).await?;
    let posture = tenant_risk_posture(&ctx, tenant)?;
    Ok(Json(TenantExposureResponse {
        tenant: tenant.slug().to_string(),
        tenant_id: *tenant.id().as_uuid(),
        exposure_cents: posture.exposure.get(),
        exposure_display: posture.exposure.to_string(),
        threshold_cents: posture.threshold.cents().get(),
        level: posture.level,
    }))
}

/// GET /v1/tenants/{tenant}/score — Guarded baseline entity score.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant}/score",
    params(("tenant" = String, Path, description = "Tenant slug or identifier")),
    responses(
        (status = 200, description = "Entity score", body = NamedEntityScore),
        (status = 403, description = "Tenant isolation violation", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown tenant", body = crate::error::ErrorBody),
    ),
    tag = "tenants"
)]
pub(crate) async fn tenant_score(
    State(state): State<AppState>,
    ActiveTenant(ctx): ActiveTenant,
    Path(tenant): Path<String>,
) -> Result<Json<NamedEntityScore>, AppError> {
    let tenant = parse_tenant(&tenant)?;
    state.require_tenant(&ctx, tenant).await?;
    let entity = EntityData::baseline(tenant);
    Ok(Json(NamedEntityScore {
        result: entity.score().into(),
        entity_name: entity.entity_name,
    }))
}

/// GET /v1/tenants/{tenant}/vendors — Guarded vendor list.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant}/vendors",
    params(("tenant" = String, Path, description = "Tenant slug or identifier")),
    responses(
        (status = 200, description = "Vendors owned by the tenant", body = TenantVendorsResponse),
        (status = 403, description = "Tenant isolation violation", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown tenant", body = crate::error::ErrorBody),
    ),
    tag = "tenants"
)]
pub(crate) async fn tenant_vendors(
    State(state): State<AppState>,
    ActiveTenant(ctx): ActiveTenant,
    Path(tenant): Path<String>,
) -> Result<Json<TenantVendorsResponse>, AppError> {
    let tenant = parse_tenant(&tenant)?;
    state.require_tenant(&ctx, tenant).await?;
    let vendors: Vec<VendorView> = state
        .vendors
        .list()
        .into_iter()
        .filter(|v| v.tenant() == Some(tenant))
        .map(VendorView::from)
        .collect();
    Ok(Json(TenantVendorsResponse {
        tenant: tenant.slug().to_string(),
        count: vendors.len(),
        vendors,
    }))
}

/// GET /v1/portfolio/score — Score of all tenants' baselines combined.
#[utoipa::path(
    get,
    path = "/v1/portfolio/score",
    responses(
        (status = 200, description = "Aggregated GLOBAL entity score", body = NamedEntityScore),
    ),
    tag = "tenants"
)]
pub(crate) async fn portfolio_score() -> Json<NamedEntityScore> {
    let entities: Vec<EntityData> = TenantKey::ALL.into_iter().map(EntityData::baseline).collect();
    let global = aggregate_entities(&entities);
    Json(NamedEntityScore {
        result: global.score().into(),
        entity_name: global.entity_name,
    })
}
