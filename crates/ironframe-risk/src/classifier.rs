//! # Risk Level Classifier
//!
//! Maps an annualized exposure and a risk threshold, both integer cents, to
//! a [`RiskLevel`]:
//!
//! | Condition                            | Level        |
//! |--------------------------------------|--------------|
//! | `exposure > threshold`               | `CRITICAL`   |
//! | `exposure >= threshold / 2` (floor)  | `ELEVATED`   |
//! | otherwise                            | `ACCEPTABLE` |
//!
//! The full-threshold comparison is strict and the half-threshold
//! comparison is inclusive. Exposure exactly at the threshold is
//! `ELEVATED`, not `CRITICAL`.

use std::num::NonZeroU64;

use ironframe_core::Cents;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

/// Three-level risk classification, ordered `Acceptable < Elevated < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Exposure below half the threshold.
    Acceptable,
    /// Exposure between half the threshold (inclusive) and the threshold (inclusive).
    Elevated,
    /// Exposure strictly above the threshold.
    Critical,
}

impl RiskLevel {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acceptable => "ACCEPTABLE",
            Self::Elevated => "ELEVATED",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strictly positive threshold in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RiskThreshold(NonZeroU64);

impl RiskThreshold {
    /// Build a threshold; `None` for zero.
    pub const fn new(cents: u64) -> Option<Self> {
        match NonZeroU64::new(cents) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// The threshold as an amount.
    pub fn cents(&self) -> Cents {
        Cents::new(self.0.get())
    }
}

impl TryFrom<u64> for RiskThreshold {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "risk threshold must be strictly positive".to_string())
    }
}

impl From<RiskThreshold> for u64 {
    fn from(value: RiskThreshold) -> Self {
        value.0.get()
    }
}

/// Classify a validated exposure against a validated threshold.
pub fn classify(exposure: Cents, threshold: RiskThreshold) -> RiskLevel {
    let threshold = threshold.cents();
    if exposure > threshold {
        RiskLevel::Critical
    } else if exposure >= threshold.half() {
        RiskLevel::Elevated
    } else {
        RiskLevel::Acceptable
    }
}

/// Classify raw signed cent amounts.
///
/// Fails with [`RiskError::InvalidInput`] when `exposure_cents < 0` OR
/// `threshold_cents <= 0`; either condition alone is enough.
pub fn classify_risk(exposure_cents: i64, threshold_cents: i64) -> Result<RiskLevel, RiskError> {
    let invalid = RiskError::InvalidInput {
        exposure_cents,
        threshold_cents,
    };
    if exposure_cents < 0 || threshold_cents <= 0 {
        return Err(invalid);
    }
    let exposure = Cents::try_from(exposure_cents).map_err(|_| invalid.clone())?;
    let threshold = u64::try_from(threshold_cents)
        .ok()
        .and_then(RiskThreshold::new)
        .ok_or(invalid)?;
    Ok(classify(exposure, threshold))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For a fixed threshold, raising exposure never lowers the level.
        #[test]
        fn classification_is_monotonic(
            threshold in 1i64..=i64::MAX / 2,
            a in 0i64..=i64::MAX / 2,
            b in 0i64..=i64::MAX / 2,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_level = classify_risk(lo, threshold).unwrap();
            let hi_level = classify_risk(hi, threshold).unwrap();
            prop_assert!(lo_level <= hi_level);
        }

        /// Invalid inputs always fail, whichever side is invalid.
        #[test]
        fn invalid_inputs_always_fail(
            exposure in i64::MIN..0i64,
            threshold in i64::MIN..=0i64,
            valid in 0i64..=i64::MAX,
        ) {
            prop_assert!(classify_risk(exposure, valid.max(1)).is_err());
            prop_assert!(classify_risk(valid, threshold).is_err());
            prop_assert!(classify_risk(exposure, threshold).is_err());
        }
    }
}
