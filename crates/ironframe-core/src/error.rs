//! # Error Hierarchy
//!
//! Structured error types for Ironframe, built with `thiserror`.
//!
//! Three failure families exist in the risk core:
//!
//! - **Invalid input** — out-of-domain arguments such as a negative exposure.
//!   Always surfaced to the caller, never silently corrected.
//! - **Access denied** — a tenant isolation violation. Kept distinct from
//!   "not found" so that audit logging can flag it as a security event.
//! - **Degraded-continue** — bad vendor records during batch evaluation.
//!   These are not errors at all; they are reported inside batch results.

use thiserror::Error;

/// Top-level error type for Ironframe.
#[derive(Error, Debug)]
pub enum IronframeError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Out-of-domain arguments to a scoring or classification operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tenant isolation violation.
    #[error("tenant isolation violation: active tenant {active} may not access {target}")]
    AccessDenied {
        /// The caller's active tenant, or `none` when no tenant route is active.
        active: String,
        /// The tenant whose resource was requested.
        target: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IronframeError {
    /// Whether this error is a tenant isolation violation.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Tenant identifier is not one of the known tenants.
    #[error("unknown tenant: \"{0}\"")]
    UnknownTenant(String),

    /// A percentage fell outside 0..=100.
    #[error("percentage out of range: {0} (expected 0-100)")]
    PercentOutOfRange(u32),

    /// A currency amount was negative.
    #[error("negative amount: {0} cents")]
    NegativeAmount(i64),

    /// Timestamp string could not be parsed.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
