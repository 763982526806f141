//! # ironframe-api — Axum API Services for Ironframe
//!
//! HTTP surface over the scoring and cadence crates.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                  | Domain                 |
//! |-------------------------|-------------------------|------------------------|
//! | `/v1/risk/*`, `/v1/entities/*`, `/v1/vendors/health` | [`routes::risk`] | Scoring |
//! | `/v1/tenants/*`, `/v1/portfolio/*` | [`routes::tenants`] | Tenant posture |
//! | `/v1/vendors`           | [`routes::vendors`]     | Vendor registry        |
//! | `/v1/cadence/*`         | [`routes::cadence`]     | Cadence escalation     |
//! | `/v1/audit`             | [`routes::audit`]       | Audit trail            |
//!
//! ## Tenant isolation
//!
//! The caller's tenant is read from the `x-ironframe-tenant` header by
//! [`extractors::ActiveTenant`]. Every route that names a tenant checks it
//! through [`state::AppState::require_tenant`]; a denial is a 403, never a
//! 404, and is written to the audit chain.
//!
//! ## OpenAPI
//!
//! Auto-generated spec via utoipa derive macros at `/openapi.json`.

pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod scheduler;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::risk::router())
        .merge(routes::tenants::router())
        .merge(routes::vendors::router())
        .merge(routes::cadence::router())
        .merge(routes::audit::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
