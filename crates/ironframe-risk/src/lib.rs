//! # ironframe-risk — Deterministic Risk Scoring
//!
//! Pure, synchronous scoring functions. None of them read the clock, draw
//! randomness, or hold state: identical inputs always produce identical
//! outputs.
//!
//! - [`classifier`] — maps an exposure and a threshold (integer cents) to a
//!   three-level [`RiskLevel`].
//! - [`entity`] — deduction/bonus model over asset state, active threats,
//!   and policy attestation.
//! - [`vendor`] — weighted documentation / industry / internal model with
//!   post-summation ceiling caps.
//! - [`exposure`] — per-tenant financial exposure, read through the tenant
//!   isolation guard.

pub mod classifier;
pub mod entity;
pub mod error;
pub mod exposure;
pub mod vendor;

// Re-export primary types.
pub use classifier::{classify, classify_risk, RiskLevel, RiskThreshold};
pub use entity::{
    aggregate_entities, score_entity, AssetRecord, AssetStatus, EntityData, EntityScoreInput,
    EntityScoreResult,
};
pub use error::RiskError;
pub use exposure::{
    breach_liability_threshold, tenant_financial_exposure, tenant_risk_posture, ExposureFactors,
    TenantRiskPosture,
};
pub use vendor::{
    score_vendor_health, ScoreCap, VendorHealthBreakdown, VendorHealthInput, VendorHealthScore,
};
