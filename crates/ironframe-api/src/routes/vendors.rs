//! # Vendor Registry API
//!
//! - **POST `/v1/vendors`** — register a vendor for cadence tracking.
//!
//! Registration names the owning tenant, so it passes through the
//! isolation guard like every other tenant-scoped write.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use ironframe_cadence::{days_until_expiration, CadenceBucket, Industry, RiskTier, VendorRecord};
use ironframe_core::TenantKey;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, ActiveTenant, Validate};
use crate::state::AppState;

/// A vendor as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorView {
    pub vendor_name: String,
    pub associated_entity: String,
    /// `Healthcare`, `Finance`, or `Energy`.
    #[schema(value_type = String)]
    pub industry: Industry,
    /// `LOW`, `HIGH`, or `CRITICAL`.
    #[schema(value_type = String)]
    pub risk_tier: RiskTier,
    pub document_expiration_date: String,
    pub last_request_sent: Option<DateTime<Utc>>,
    /// `90`, `60`, `30`, or `OVERDUE`.
    #[schema(value_type = String)]
    pub current_cadence: CadenceBucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_contact_email: Option<String>,
}

impl From<VendorRecord> for VendorView {
    fn from(v: VendorRecord) -> Self {
        Self {
            vendor_name: v.vendor_name,
            associated_entity: v.associated_entity,
            industry: v.industry,
            risk_tier: v.risk_tier,
            document_expiration_date: v.document_expiration_date,
            last_request_sent: v.last_request_sent,
            current_cadence: v.current_cadence,
            compliance_contact_email: v.compliance_contact_email,
        }
    }
}

/// Request to register a vendor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterVendorRequest {
    pub vendor_name: String,
    /// Owning tenant (slug or entity name).
    pub associated_entity: String,
    #[schema(value_type = String)]
    pub industry: Industry,
    #[schema(value_type = String)]
    pub risk_tier: RiskTier,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub document_expiration_date: String,
    #[serde(default)]
    pub compliance_contact_email: Option<String>,
}

impl Validate for RegisterVendorRequest {
    fn validate(&self) -> Result<(), String> {
        if self.vendor_name.trim().is_empty() {
            return Err("vendor_name must not be empty".to_string());
        }
        if self.associated_entity.parse::<TenantKey>().is_err() {
            return Err(format!(
                "associated_entity {:?} is not a known tenant",
                self.associated_entity
            ));
        }
        if days_until_expiration(&self.document_expiration_date, Utc::now())
            .known()
            .is_none()
        {
            return Err(format!(
                "document_expiration_date {:?} is not a valid date",
                self.document_expiration_date
            ));
        }
        Ok(())
    }
}

/// Build the vendor registry router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/vendors", post(register_vendor))
}

/// POST /v1/vendors — Register a vendor.
///
/// Vendor names are unique across the whole registry, not only within an
/// entity: dispatch records and milestone claims are keyed by vendor name,
/// so a second "Stripe" under another entity would share the first one's
/// claims and never be contacted.
#[utoipa::path(
    post,
    path = "/v1/vendors",
    request_body = RegisterVendorRequest,
    responses(
        (status = 201, description = "Vendor registered", body = VendorView),
        (status = 403, description = "Tenant isolation violation", body = crate::error::ErrorBody),
        (status = 409, description = "Vendor name already registered under any entity", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "vendors"
)]
pub(crate) async fn register_vendor(
    State(state): State<AppState>,
    ActiveTenant(ctx): ActiveTenant,
    body: Result<Json<RegisterVendorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VendorView>), AppError> {
    let req = extract_validated_json(body)?;
    let tenant: TenantKey = req
        .associated_entity
        .parse()
        .map_err(|_| AppError::Validation("unknown tenant".to_string()))?;
    state.require_tenant(&ctx, tenant).await?;

    let now = Utc::now();
    let current_cadence = days_until_expiration(&req.document_expiration_date, now)
        .bucket()
        .ok_or_else(|| AppError::Validation("document_expiration_date is not a valid date".into()))?;

    let vendor = VendorRecord {
        vendor_name: req.vendor_name.trim().to_string(),
        associated_entity: tenant.entity_name().to_string(),
        industry: req.industry,
        risk_tier: req.risk_tier,
        document_expiration_date: req.document_expiration_date,
        last_request_sent: None,
        current_cadence,
        compliance_contact_email: req.compliance_contact_email,
    };

    if !state
        .vendors
        .insert_new(vendor.vendor_name.clone(), vendor.clone())
    {
        return Err(AppError::Conflict(format!(
            "vendor {:?} is already registered",
            vendor.vendor_name
        )));
    }
    state.persist_vendor(&vendor).await?;
    tracing::info!(
        vendor = %vendor.vendor_name,
        tenant = %tenant,
        bucket = %vendor.current_cadence,
        "vendor registered"
    );

    Ok((StatusCode::CREATED, Json(vendor.into())))
}
