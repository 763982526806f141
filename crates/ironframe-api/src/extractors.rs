//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request DTOs, JSON body helpers, and the
//! [`ActiveTenant`] extractor that resolves the caller's tenant context.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Json;
use ironframe_core::{TenantContext, TenantKey};

use crate::error::AppError;

/// Header naming the caller's active tenant.
pub const TENANT_HEADER: &str = "x-ironframe-tenant";

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// The caller's tenant context, read from the `x-ironframe-tenant` header.
///
/// Only a known tenant slug or identifier becomes an active tenant. A
/// missing, non-UTF-8, or unrecognised header yields a context with no
/// active tenant, which the isolation guard then denies for any named
/// tenant. Extraction itself never fails.
#[derive(Debug, Clone, Copy)]
pub struct ActiveTenant(pub TenantContext);

impl<S: Send + Sync> FromRequestParts<S> for ActiveTenant {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<TenantKey>().ok());
        Ok(Self(match key {
            Some(key) => TenantContext::for_tenant(key),
            None => TenantContext::none(),
        }))
    }
}

impl ActiveTenant {
    /// The active tenant, for routes that only ever serve the caller's own
    /// records. Fails closed with 403 when no tenant is active.
    pub fn require_active(&self) -> Result<TenantKey, AppError> {
        self.0.active().ok_or_else(|| {
            tracing::warn!("tenant-scoped request without an active tenant");
            AppError::TenantAccessDenied {
                active: "none".to_string(),
                target: "tenant-scoped records".to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> TenantContext {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(TENANT_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let ActiveTenant(ctx) = ActiveTenant::from_request_parts(&mut parts, &()).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn known_slug_becomes_active_tenant() {
        assert_eq!(extract(Some("gridcore")).await.active(), Some(TenantKey::Gridcore));
    }

    #[tokio::test]
    async fn unknown_or_missing_header_has_no_tenant() {
        assert_eq!(extract(Some("acme")).await.active(), None);
        assert_eq!(extract(None).await.active(), None);
    }

    #[test]
    fn require_active_fails_closed() {
        assert!(ActiveTenant(TenantContext::none()).require_active().is_err());
        let active = ActiveTenant(TenantContext::for_tenant(TenantKey::Vaultbank));
        assert_eq!(active.require_active().unwrap(), TenantKey::Vaultbank);
    }
}
