//! # Tenant Financial Exposure
//!
//! Annualized loss exposure per tenant, computed in integer cents:
//!
//! ```text
//! exposure = round_half_up(threat_severity * asset_value * industry_multiplier)
//! ```
//!
//! with the multiplier expressed in basis points. Every lookup goes through
//! the tenant isolation guard first; a denied read returns
//! `AccessDenied` and never a partial figure.

use ironframe_core::{BasisPoints, Cents, IronframeError, TenantContext, TenantKey};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, RiskLevel, RiskThreshold};
use crate::error::RiskError;

const fn threshold(cents: u64) -> RiskThreshold {
    match RiskThreshold::new(cents) {
        Some(t) => t,
        None => panic!("breach liability threshold must be positive"),
    }
}

const MEDSHIELD_LIABILITY: RiskThreshold = threshold(1_110_000_000);
const VAULTBANK_LIABILITY: RiskThreshold = threshold(590_000_000);
const GRIDCORE_LIABILITY: RiskThreshold = threshold(470_000_000);

/// Inputs to the exposure calculation for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureFactors {
    /// Threat severity on a 1–5 scale.
    pub threat_severity: u32,
    /// Value of the exposed asset base.
    pub asset_value: Cents,
    /// Industry multiplier.
    pub industry_multiplier: BasisPoints,
}

impl ExposureFactors {
    /// Baseline factors for a tenant.
    pub fn for_tenant(tenant: TenantKey) -> Self {
        match tenant {
            TenantKey::Medshield => Self {
                threat_severity: 3,
                asset_value: Cents::from_units(1_800_000),
                industry_multiplier: BasisPoints::new(13_000),
            },
            TenantKey::Vaultbank => Self {
                threat_severity: 5,
                asset_value: Cents::from_units(2_500_000),
                industry_multiplier: BasisPoints::new(16_000),
            },
            TenantKey::Gridcore => Self {
                threat_severity: 4,
                asset_value: Cents::from_units(2_100_000),
                industry_multiplier: BasisPoints::new(14_500),
            },
        }
    }

    /// Exposure in cents, or `None` on overflow.
    pub fn exposure(&self) -> Option<Cents> {
        let base = self
            .asset_value
            .get()
            .checked_mul(u64::from(self.threat_severity))?;
        self.industry_multiplier.scale(Cents::new(base))
    }
}

/// Average breach liability used as the tenant's risk threshold.
pub fn breach_liability_threshold(tenant: TenantKey) -> RiskThreshold {
    match tenant {
        TenantKey::Medshield => MEDSHIELD_LIABILITY,
        TenantKey::Vaultbank => VAULTBANK_LIABILITY,
        TenantKey::Gridcore => GRIDCORE_LIABILITY,
    }
}

/// Exposure, threshold, and resulting level for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRiskPosture {
    /// The tenant.
    pub tenant: TenantKey,
    /// Computed exposure.
    pub exposure: Cents,
    /// Breach liability threshold.
    pub threshold: RiskThreshold,
    /// Classification of `exposure` against `threshold`.
    pub level: RiskLevel,
}

/// Financial exposure for `tenant`, read through the isolation guard.
pub fn tenant_financial_exposure(
    ctx: &TenantContext,
    tenant: TenantKey,
) -> Result<Cents, IronframeError> {
    if let Err(err) = ctx.require(tenant) {
        tracing::warn!(
            active = ?ctx.active(),
            target = %tenant,
            "tenant isolation violation on financial exposure lookup"
        );
        return Err(err);
    }
    ExposureFactors::for_tenant(tenant).exposure().ok_or_else(|| {
        RiskError::ExposureOverflow {
            tenant: tenant.to_string(),
        }
        .into()
    })
}

/// Guarded exposure plus its classification against the tenant's threshold.
pub fn tenant_risk_posture(
    ctx: &TenantContext,
    tenant: TenantKey,
) -> Result<TenantRiskPosture, IronframeError> {
    let exposure = tenant_financial_exposure(ctx, tenant)?;
    let threshold = breach_liability_threshold(tenant);
    Ok(TenantRiskPosture {
        tenant,
        exposure,
        threshold,
        level: classify(exposure, threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposure_is_integer_exact() {
        let ctx = TenantContext::for_tenant(TenantKey::Medshield);
        // 3 * $1,800,000 * 1.3 = $7,020,000
        assert_eq!(
            tenant_financial_exposure(&ctx, TenantKey::Medshield).unwrap(),
            Cents::from_units(7_020_000)
        );
    }

    #[test]
    fn fractional_multiplier_has_no_drift() {
        let ctx = TenantContext::for_tenant(TenantKey::Gridcore);
        // 4 * $2,100,000 * 1.45 = $12,180,000
        assert_eq!(
            tenant_financial_exposure(&ctx, TenantKey::Gridcore).unwrap(),
            Cents::from_units(12_180_000)
        );
    }

    #[test]
    fn cross_tenant_lookup_is_denied() {
        let ctx = TenantContext::for_tenant(TenantKey::Medshield);
        let err = tenant_financial_exposure(&ctx, TenantKey::Vaultbank).unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn missing_context_is_denied() {
        let err = tenant_risk_posture(&TenantContext::none(), TenantKey::Gridcore).unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn postures_classify_against_breach_liability() {
        let medshield =
            tenant_risk_posture(&TenantContext::for_tenant(TenantKey::Medshield), TenantKey::Medshield)
                .unwrap();
        assert_eq!(medshield.level, RiskLevel::Elevated);

        let vaultbank =
            tenant_risk_posture(&TenantContext::for_tenant(TenantKey::Vaultbank), TenantKey::Vaultbank)
                .unwrap();
        assert_eq!(vaultbank.exposure, Cents::from_units(20_000_000));
        assert_eq!(vaultbank.level, RiskLevel::Critical);
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let factors = ExposureFactors {
            threat_severity: 5,
            asset_value: Cents::new(u64::MAX / 2),
            industry_multiplier: BasisPoints::ONE,
        };
        assert_eq!(factors.exposure(), None);
    }
}
