//! Risk scoring errors.

use ironframe_core::IronframeError;
use thiserror::Error;

/// Errors raised by the risk scoring functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    /// Exposure was negative or threshold was not strictly positive.
    #[error(
        "financial values must be non-negative integers with a positive threshold \
         (exposure {exposure_cents}, threshold {threshold_cents})"
    )]
    InvalidInput {
        /// The exposure that was supplied, in cents.
        exposure_cents: i64,
        /// The threshold that was supplied, in cents.
        threshold_cents: i64,
    },

    /// Exposure arithmetic exceeded the representable range.
    #[error("financial exposure overflow for tenant {tenant}")]
    ExposureOverflow {
        /// The tenant whose factors overflowed.
        tenant: String,
    },
}

impl From<RiskError> for IronframeError {
    fn from(err: RiskError) -> Self {
        IronframeError::InvalidInput(err.to_string())
    }
}
