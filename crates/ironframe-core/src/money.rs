//! # Integer Currency Amounts
//!
//! Exposure amounts and risk thresholds are exact counts of currency
//! sub-units (cents). Floating point and arbitrary-precision decimals are
//! never used: a rounding error at a classification boundary flips the
//! risk level.
//!
//! Multipliers (industry factors) are expressed in basis points so that
//! scaling stays in integer arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A non-negative amount of currency sub-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(u64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Wrap a cent count.
    pub const fn new(cents: u64) -> Self {
        Self(cents)
    }

    /// Build from whole currency units.
    pub const fn from_units(units: u64) -> Self {
        Self(units * 100)
    }

    /// The raw cent count.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }

    /// Half of this amount, rounded toward zero.
    pub const fn half(self) -> Cents {
        Cents(self.0 / 2)
    }
}

impl TryFrom<i64> for Cents {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Cents)
            .map_err(|_| ValidationError::NegativeAmount(value))
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A multiplier in basis points (1/100 of a percent). `10_000` is 1.0x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// 1.0x.
    pub const ONE: BasisPoints = BasisPoints(10_000);

    /// Wrap a basis point count.
    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    /// The raw basis point count.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Scale an amount by this multiplier, rounding half up.
    ///
    /// Returns `None` if the result does not fit in `u64` cents.
    pub fn scale(self, amount: Cents) -> Option<Cents> {
        let product = u128::from(amount.get()) * u128::from(self.0);
        let rounded = (product + 5_000) / 10_000;
        u64::try_from(rounded).ok().map(Cents::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_rejected() {
        assert_eq!(
            Cents::try_from(-1),
            Err(ValidationError::NegativeAmount(-1))
        );
        assert_eq!(Cents::try_from(0).unwrap(), Cents::ZERO);
    }

    #[test]
    fn half_is_floor() {
        assert_eq!(Cents::new(7).half(), Cents::new(3));
        assert_eq!(Cents::new(1_000_000_000).half(), Cents::new(500_000_000));
    }

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Cents::new(123_456).to_string(), "$1234.56");
        assert_eq!(Cents::from_units(5).to_string(), "$5.00");
    }

    #[test]
    fn basis_points_scale_rounds_half_up() {
        // 1.3x of $1.00
        assert_eq!(BasisPoints::new(13_000).scale(Cents::new(100)), Some(Cents::new(130)));
        // 0.5 cent rounds up
        assert_eq!(BasisPoints::new(5_000).scale(Cents::new(1)), Some(Cents::new(1)));
        assert_eq!(BasisPoints::ONE.scale(Cents::new(42)), Some(Cents::new(42)));
    }

    #[test]
    fn basis_points_scale_overflow_is_none() {
        assert_eq!(BasisPoints::new(20_000).scale(Cents::new(u64::MAX)), None);
    }
}
