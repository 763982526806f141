//! # Vendor Health Scorer
//!
//! Independent weighted model for third-party vendors, computed as a
//! two-stage pipeline:
//!
//! 1. **Weigh** — three components, each clamped to its own range:
//!    documentation (0–50), industry alerts (0–30), internal process (0–20).
//! 2. **Cap** — ceiling overrides applied to the summed score: an expired
//!    primary evidence document caps the total at 65, an active breach-level
//!    alert caps it at 55. Caps never subtract; they only lower the ceiling.

use std::collections::HashSet;

use ironframe_core::LetterGrade;
use serde::{Deserialize, Serialize};

const DOCS_MAX: i32 = 50;
const INDUSTRY_MAX: i32 = 30;
const INTERNAL_MAX: i32 = 20;

const EXPIRED_EVIDENCE_CAP: u8 = 65;
const ACTIVE_BREACH_CAP: u8 = 55;

/// Inputs to [`score_vendor_health`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorHealthInput {
    /// Days until the primary evidence document (SOC 2) expires; `<= 0` is expired.
    pub days_until_primary_expiration: i64,
    /// Evidence documents on file (`SOC2`, `ISO`, `ISO 27001`, `INSURANCE`, ...).
    #[serde(default)]
    pub evidence_docs: Vec<String>,
    /// A recent, non-breach industry alert mentions this vendor.
    #[serde(default)]
    pub has_active_industry_alert: bool,
    /// A breach-level alert is active for this vendor.
    #[serde(default)]
    pub has_active_breach_alert: bool,
    /// A document version or signature is pending.
    #[serde(default)]
    pub has_pending_versioning: bool,
    /// A stakeholder escalation is open.
    #[serde(default)]
    pub has_stakeholder_escalation: bool,
    /// Manual review is required.
    #[serde(default)]
    pub requires_manual_review: bool,
}

/// A ceiling applied after summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCap {
    /// Primary evidence expired: total capped at 65.
    ExpiredEvidence,
    /// Active breach alert: total capped at 55.
    ActiveBreach,
}

impl ScoreCap {
    /// The ceiling this cap imposes.
    pub fn ceiling(&self) -> u8 {
        match self {
            Self::ExpiredEvidence => EXPIRED_EVIDENCE_CAP,
            Self::ActiveBreach => ACTIVE_BREACH_CAP,
        }
    }
}

/// Per-component scores and the caps that were applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorHealthBreakdown {
    /// Documentation completeness, 0–50.
    pub documentation: u8,
    /// Industry alert standing, 0–30.
    pub industry: u8,
    /// Internal process standing, 0–20.
    pub internal: u8,
    /// Sum of the three components before caps.
    pub uncapped_total: u8,
    /// Caps applied, in evaluation order.
    pub caps_applied: Vec<ScoreCap>,
}

/// Output of [`score_vendor_health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorHealthScore {
    /// Final score, 0–100.
    pub score: u8,
    /// Grade derived from the score.
    pub grade: LetterGrade,
    /// Human-readable penalty lines.
    pub breakdown: Vec<String>,
    /// Structured components.
    pub components: VendorHealthBreakdown,
}

/// Score a vendor's health. Pure and deterministic.
pub fn score_vendor_health(input: &VendorHealthInput) -> VendorHealthScore {
    let mut notes = Vec::new();
    let (documentation, industry, internal) = weigh(input, &mut notes);
    let uncapped_total = documentation + industry + internal;
    let (score, caps_applied) = apply_caps(uncapped_total, input);

    if notes.is_empty() {
        notes.push(
            "SOC2/ISO/Insurance current, no industry alerts, and no internal review penalties"
                .to_string(),
        );
    }

    VendorHealthScore {
        score,
        grade: LetterGrade::from_score(score),
        breakdown: notes,
        components: VendorHealthBreakdown {
            documentation,
            industry,
            internal,
            uncapped_total,
            caps_applied,
        },
    }
}

fn weigh(input: &VendorHealthInput, notes: &mut Vec<String>) -> (u8, u8, u8) {
    let docs: HashSet<String> = input
        .evidence_docs
        .iter()
        .map(|d| d.trim().to_uppercase())
        .collect();

    let mut documentation = DOCS_MAX;
    let mut industry = INDUSTRY_MAX;
    let mut internal = INTERNAL_MAX;

    let mut penalize = |score: &mut i32, points: i32, note: &str| {
        *score -= points;
        notes.push(note.to_string());
    };

    if !docs.contains("SOC2") {
        penalize(&mut documentation, 25, "SOC2 missing: -25 (Docs)");
    }
    if input.days_until_primary_expiration <= 0 {
        penalize(&mut documentation, 30, "SOC2 expired: -30 (Docs)");
    }
    if !docs.contains("ISO") && !docs.contains("ISO 27001") {
        penalize(&mut documentation, 12, "ISO missing: -12 (Docs)");
    }
    if !docs.contains("INSURANCE") {
        penalize(&mut documentation, 13, "Insurance missing: -13 (Docs)");
    }

    if input.has_active_breach_alert {
        penalize(&mut industry, 30, "Active industry breach alert: -30 (Industry)");
    } else if input.has_active_industry_alert {
        penalize(&mut industry, 15, "Recent industry alert(s): -15 (Industry)");
    }

    if input.requires_manual_review {
        penalize(&mut internal, 10, "Manual review required: -10 (Internal)");
    }
    if input.has_pending_versioning {
        penalize(&mut internal, 6, "Pending version/signature: -6 (Internal)");
    }
    if input.has_stakeholder_escalation {
        penalize(&mut internal, 4, "Stakeholder escalation open: -4 (Internal)");
    }

    (
        documentation.clamp(0, DOCS_MAX) as u8,
        industry.clamp(0, INDUSTRY_MAX) as u8,
        internal.clamp(0, INTERNAL_MAX) as u8,
    )
}

fn apply_caps(total: u8, input: &VendorHealthInput) -> (u8, Vec<ScoreCap>) {
    let mut caps = Vec::new();
    if input.days_until_primary_expiration <= 0 {
        caps.push(ScoreCap::ExpiredEvidence);
    }
    if input.has_active_breach_alert {
        caps.push(ScoreCap::ActiveBreach);
    }
    let score = caps.iter().fold(total, |acc, cap| acc.min(cap.ceiling()));
    (score.min(100), caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> VendorHealthInput {
        VendorHealthInput {
            days_until_primary_expiration: 120,
            evidence_docs: vec!["SOC2".into(), "ISO 27001".into(), "Insurance".into()],
            ..Default::default()
        }
    }

    #[test]
    fn healthy_vendor_scores_100() {
        let result = score_vendor_health(&healthy());
        assert_eq!(result.score, 100);
        assert_eq!(result.grade, LetterGrade::A);
        assert_eq!(result.breakdown.len(), 1);
        assert!(result.components.caps_applied.is_empty());
    }

    #[test]
    fn document_names_are_normalized() {
        let mut input = healthy();
        input.evidence_docs = vec![" soc2 ".into(), "iso".into(), "INSURANCE".into()];
        assert_eq!(score_vendor_health(&input).score, 100);
    }

    #[test]
    fn expired_evidence_caps_at_65() {
        let mut input = healthy();
        input.days_until_primary_expiration = 0;
        let result = score_vendor_health(&input);
        // docs 50 - 30 = 20; 20 + 30 + 20 = 70, capped to 65
        assert_eq!(result.components.documentation, 20);
        assert_eq!(result.components.uncapped_total, 70);
        assert_eq!(result.score, 65);
        assert_eq!(result.components.caps_applied, vec![ScoreCap::ExpiredEvidence]);
    }

    #[test]
    fn cap_is_a_ceiling_not_a_subtraction() {
        let mut input = healthy();
        input.days_until_primary_expiration = -5;
        input.evidence_docs.clear();
        let result = score_vendor_health(&input);
        // docs 50 - 25 - 30 - 12 - 13 < 0 -> 0; 0 + 30 + 20 = 50, already under 65
        assert_eq!(result.components.documentation, 0);
        assert_eq!(result.score, 50);
    }

    #[test]
    fn active_breach_caps_at_55_and_zeroes_industry() {
        let mut input = healthy();
        input.has_active_breach_alert = true;
        input.has_active_industry_alert = true;
        let result = score_vendor_health(&input);
        assert_eq!(result.components.industry, 0);
        assert_eq!(result.components.uncapped_total, 70);
        assert_eq!(result.score, 55);
        assert_eq!(result.grade, LetterGrade::F);
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn industry_alert_without_breach_costs_15() {
        let mut input = healthy();
        input.has_active_industry_alert = true;
        let result = score_vendor_health(&input);
        assert_eq!(result.components.industry, 15);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn internal_penalties_accumulate_and_clamp() {
        let mut input = healthy();
        input.requires_manual_review = true;
        input.has_pending_versioning = true;
        input.has_stakeholder_escalation = true;
        let result = score_vendor_health(&input);
        assert_eq!(result.components.internal, 0);
        assert_eq!(result.score, 80);
        assert_eq!(result.breakdown.len(), 3);
    }

    #[test]
    fn both_caps_take_the_lower_ceiling() {
        let mut input = healthy();
        input.days_until_primary_expiration = -1;
        input.has_active_breach_alert = true;
        let result = score_vendor_health(&input);
        assert_eq!(result.score, 40);
        assert_eq!(result.components.caps_applied.len(), 2);
    }
}
