//! # Vendor Records and Cadence Buckets
//!
//! A vendor's urgency is derived from its evidence-expiration date and the
//! evaluation instant:
//!
//! ```text
//! days = ceil((expiration - now) / 1 day)
//! ```
//!
//! | Days           | Bucket    |
//! |----------------|-----------|
//! | `days <= 0`    | `OVERDUE` |
//! | `1..=30`       | `30`      |
//! | `31..=60`      | `60`      |
//! | `> 60`         | `90`      |
//!
//! An expiration string that cannot be parsed yields
//! [`DaysUntilExpiration::Unknown`], never a numeric sentinel, so a bad
//! record can never fall into the `OVERDUE` bucket by accident.

use chrono::{DateTime, Utc};
use ironframe_core::{parse_instant, TenantKey, DAY_MILLIS};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classifications
// ---------------------------------------------------------------------------

/// Industry a vendor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    /// Healthcare.
    Healthcare,
    /// Financial services.
    Finance,
    /// Energy and critical infrastructure.
    Energy,
}

/// Vendor risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Critical dependency.
    Critical,
    /// High-risk dependency.
    High,
    /// Low-risk dependency.
    Low,
}

/// Cadence bucket derived from days until expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CadenceBucket {
    /// More than 60 days out.
    #[serde(rename = "90")]
    Ninety,
    /// 31 to 60 days out.
    #[serde(rename = "60")]
    Sixty,
    /// 1 to 30 days out.
    #[serde(rename = "30")]
    Thirty,
    /// Expired.
    #[serde(rename = "OVERDUE")]
    Overdue,
}

impl CadenceBucket {
    /// Bucket for a known day count.
    pub fn from_days(days: i64) -> Self {
        if days <= 0 {
            Self::Overdue
        } else if days <= 30 {
            Self::Thirty
        } else if days <= 60 {
            Self::Sixty
        } else {
            Self::Ninety
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ninety => "90",
            Self::Sixty => "60",
            Self::Thirty => "30",
            Self::Overdue => "OVERDUE",
        }
    }
}

impl std::fmt::Display for CadenceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Days until expiration
// ---------------------------------------------------------------------------

/// Whole days until a vendor's evidence expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum DaysUntilExpiration {
    /// Ceiling of the remaining days; zero or negative once expired.
    Known(i64),
    /// The expiration date could not be parsed.
    Unknown,
}

impl DaysUntilExpiration {
    /// The day count, if known.
    pub fn known(&self) -> Option<i64> {
        match self {
            Self::Known(days) => Some(*days),
            Self::Unknown => None,
        }
    }

    /// The cadence bucket, if the day count is known.
    pub fn bucket(&self) -> Option<CadenceBucket> {
        self.known().map(CadenceBucket::from_days)
    }
}

/// Days until `expiration` as seen from `now`, rounded up to whole days.
pub fn days_until_expiration(expiration: &str, now: DateTime<Utc>) -> DaysUntilExpiration {
    match parse_instant(expiration) {
        Ok(at) => {
            let millis = (at - now).num_milliseconds();
            DaysUntilExpiration::Known(ceil_div(millis, DAY_MILLIS))
        }
        Err(_) => DaysUntilExpiration::Unknown,
    }
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    if numerator.rem_euclid(denominator) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

// ---------------------------------------------------------------------------
// VendorRecord
// ---------------------------------------------------------------------------

/// A third-party vendor tracked for evidence expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRecord {
    /// Unique vendor name; the idempotence key together with the milestone.
    pub vendor_name: String,
    /// Owning entity (`MEDSHIELD`, `VAULTBANK`, `GRIDCORE`).
    pub associated_entity: String,
    /// Industry served.
    pub industry: Industry,
    /// Risk tier.
    pub risk_tier: RiskTier,
    /// Evidence expiration date as supplied (RFC 3339 or `YYYY-MM-DD`).
    pub document_expiration_date: String,
    /// When the last cadence message for this vendor was sent.
    #[serde(default)]
    pub last_request_sent: Option<DateTime<Utc>>,
    /// Cached cadence bucket. Recomputed on every evaluation.
    pub current_cadence: CadenceBucket,
    /// Explicit compliance contact; derived from the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_contact_email: Option<String>,
}

impl VendorRecord {
    /// The tenant owning this vendor, if the entity name is a known tenant.
    pub fn tenant(&self) -> Option<TenantKey> {
        self.associated_entity.parse().ok()
    }

    /// Days until this vendor's evidence expires.
    pub fn days_until_expiration(&self, now: DateTime<Utc>) -> DaysUntilExpiration {
        days_until_expiration(&self.document_expiration_date, now)
    }

    /// The vendor's compliance contact address.
    ///
    /// An explicit, non-blank `compliance_contact_email` wins. Otherwise the
    /// vendor name is lower-cased, runs of non-alphanumerics become `-`, and
    /// the slug is addressed at `domain`.
    pub fn contact_email(&self, domain: &str) -> String {
        if let Some(email) = self
            .compliance_contact_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            return email.to_string();
        }
        format!("{}@{}", vendor_slug(&self.vendor_name), domain)
    }
}

fn vendor_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn expiring_in(duration: Duration) -> String {
        (now() + duration).to_rfc3339()
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(CadenceBucket::from_days(-3), CadenceBucket::Overdue);
        assert_eq!(CadenceBucket::from_days(0), CadenceBucket::Overdue);
        assert_eq!(CadenceBucket::from_days(1), CadenceBucket::Thirty);
        assert_eq!(CadenceBucket::from_days(30), CadenceBucket::Thirty);
        assert_eq!(CadenceBucket::from_days(31), CadenceBucket::Sixty);
        assert_eq!(CadenceBucket::from_days(60), CadenceBucket::Sixty);
        assert_eq!(CadenceBucket::from_days(61), CadenceBucket::Ninety);
    }

    #[test]
    fn partial_days_round_up() {
        let days = days_until_expiration(&expiring_in(Duration::hours(1)), now());
        assert_eq!(days, DaysUntilExpiration::Known(1));

        let days = days_until_expiration(&expiring_in(Duration::days(30)), now());
        assert_eq!(days, DaysUntilExpiration::Known(30));

        let days =
            days_until_expiration(&expiring_in(Duration::days(30) + Duration::seconds(1)), now());
        assert_eq!(days, DaysUntilExpiration::Known(31));
    }

    #[test]
    fn past_expiration_is_overdue() {
        let days = days_until_expiration(&expiring_in(-Duration::hours(36)), now());
        // ceil(-1.5) = -1
        assert_eq!(days, DaysUntilExpiration::Known(-1));
        assert_eq!(days.bucket(), Some(CadenceBucket::Overdue));

        let exact = days_until_expiration(&now().to_rfc3339(), now());
        assert_eq!(exact.bucket(), Some(CadenceBucket::Overdue));
    }

    #[test]
    fn malformed_date_is_unknown_not_overdue() {
        let days = days_until_expiration("next spring", now());
        assert_eq!(days, DaysUntilExpiration::Unknown);
        assert_eq!(days.bucket(), None);
        assert_eq!(days_until_expiration("", now()), DaysUntilExpiration::Unknown);
    }

    #[test]
    fn bare_dates_parse_at_midnight() {
        // 2026-03-31T00:00Z is 29.5 days after 2026-03-01T12:00Z
        assert_eq!(
            days_until_expiration("2026-03-31", now()),
            DaysUntilExpiration::Known(30)
        );
    }

    #[test]
    fn contact_email_is_slugged() {
        let vendor = VendorRecord {
            vendor_name: "Palo Alto Networks".into(),
            associated_entity: "VAULTBANK".into(),
            industry: Industry::Finance,
            risk_tier: RiskTier::Critical,
            document_expiration_date: "2026-04-01".into(),
            last_request_sent: None,
            current_cadence: CadenceBucket::Sixty,
            compliance_contact_email: None,
        };
        assert_eq!(
            vendor.contact_email("vendors.ironframe.local"),
            "palo-alto-networks@vendors.ironframe.local"
        );
        assert_eq!(vendor.tenant(), Some(TenantKey::Vaultbank));

        let explicit = VendorRecord {
            compliance_contact_email: Some("grc@paloalto.example".into()),
            ..vendor
        };
        assert_eq!(explicit.contact_email("ignored"), "grc@paloalto.example");
    }

    #[test]
    fn slug_trims_separators() {
        assert_eq!(vendor_slug("  AT&T -- Cloud!  "), "at-t-cloud");
        assert_eq!(vendor_slug("GCP Cloud"), "gcp-cloud");
    }

    #[test]
    fn bucket_serializes_as_label() {
        assert_eq!(serde_json::to_string(&CadenceBucket::Ninety).unwrap(), "\"90\"");
        assert_eq!(
            serde_json::from_str::<CadenceBucket>("\"OVERDUE\"").unwrap(),
            CadenceBucket::Overdue
        );
    }
}
