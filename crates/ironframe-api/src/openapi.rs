//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ironframe API",
        version = "0.1.0",
        description = "Tenant-isolated risk posture, entity and vendor health scoring, and vendor compliance cadence escalation."
    ),
    paths(
        // Risk
        crate::routes::risk::classify,
        crate::routes::risk::score_entity_handler,
        crate::routes::risk::vendor_health,
        // Tenants
        crate::routes::tenants::tenant_exposure,
        crate::routes::tenants::tenant_score,
        crate::routes::tenants::tenant_vendors,
        crate::routes::tenants::portfolio_score,
        // Vendors
        crate::routes::vendors::register_vendor,
        // Cadence
        crate::routes::cadence::evaluate,
        crate::routes::cadence::list_outbound,
        crate::routes::cadence::acknowledge,
        crate::routes::cadence::list_unresponsive,
        // Audit
        crate::routes::audit::audit_log,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Risk DTOs
        crate::routes::risk::ClassifyRiskRequest,
        crate::routes::risk::ClassifyRiskResponse,
        crate::routes::risk::AssetInput,
        crate::routes::risk::ScoreEntityRequest,
        crate::routes::risk::EntityScoreResponse,
        crate::routes::risk::VendorHealthRequest,
        crate::routes::risk::VendorHealthResponse,
        // Tenant DTOs
        crate::routes::tenants::TenantExposureResponse,
        crate::routes::tenants::NamedEntityScore,
        crate::routes::tenants::TenantVendorsResponse,
        // Vendor DTOs
        crate::routes::vendors::VendorView,
        crate::routes::vendors::RegisterVendorRequest,
        // Cadence DTOs
        crate::routes::cadence::EvaluationResponse,
        crate::routes::cadence::OutboundMessageView,
        crate::routes::cadence::OutboundListResponse,
        // Audit DTOs
        crate::routes::audit::AuditEntryView,
        crate::routes::audit::AuditLogResponse,
    )),
    tags(
        (name = "risk", description = "Risk classification and health scoring"),
        (name = "tenants", description = "Tenant-isolated posture views"),
        (name = "vendors", description = "Vendor registry"),
        (name = "cadence", description = "Compliance cadence escalation and outbound log"),
        (name = "audit", description = "Hash-chained audit trail"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/v1/risk/classify",
            "/v1/tenants/{tenant}/exposure",
            "/v1/vendors",
            "/v1/cadence/outbound/{id}/ack",
            "/v1/audit",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
