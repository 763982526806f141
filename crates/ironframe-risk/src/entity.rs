//! # Entity Health Scorer
//!
//! Deduction/bonus model over an entity's asset states, active threats, and
//! policy-attestation completeness:
//!
//! ```text
//! score = clamp(100
//!               - 15 * critical_assets
//!               - 10 * vulnerable_assets
//!               - 20 * active_threats
//!               + 2 * floor(attestation_percent / 10), 0, 100)
//! ```
//!
//! `WARNING` and `SECURE` assets carry no deduction.

use ironframe_core::{LetterGrade, TenantKey, ValidationError};
use serde::{Deserialize, Serialize};

const BASE_SCORE: i64 = 100;
const CRITICAL_ASSET_PENALTY: i64 = 15;
const VULNERABLE_ASSET_PENALTY: i64 = 10;
const ACTIVE_THREAT_PENALTY: i64 = 20;
const ATTESTATION_BONUS_PER_DECILE: u32 = 2;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Security status of an asset. Transitioned by remediation, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    /// No known issues.
    Secure,
    /// Degraded but not exploitable.
    Warning,
    /// Known exploitable weakness.
    Vulnerable,
    /// Actively compromised or failing.
    Critical,
}

/// An asset belonging to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable asset identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: AssetStatus,
}

impl AssetRecord {
    /// Build an asset record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: AssetStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// Input / result
// ---------------------------------------------------------------------------

/// Inputs to [`score_entity`]. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScoreInput {
    /// The entity's assets.
    pub assets: Vec<AssetRecord>,
    /// Count of active threats.
    pub active_threats: u32,
    /// Policy attestation completeness, 0–100.
    pub policy_attestation_percent: u8,
}

impl EntityScoreInput {
    /// Build an input, rejecting attestation percentages above 100.
    pub fn new(
        assets: Vec<AssetRecord>,
        active_threats: u32,
        policy_attestation_percent: u8,
    ) -> Result<Self, ValidationError> {
        let input = Self {
            assets,
            active_threats,
            policy_attestation_percent,
        };
        input.validate()?;
        Ok(input)
    }

    /// Check the attestation percentage range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.policy_attestation_percent > 100 {
            return Err(ValidationError::PercentOutOfRange(u32::from(
                self.policy_attestation_percent,
            )));
        }
        Ok(())
    }

    fn count(&self, status: AssetStatus) -> u32 {
        let n = self.assets.iter().filter(|a| a.status == status).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}

/// Output of [`score_entity`], including the components that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScoreResult {
    /// Final score, 0–100.
    pub score: u8,
    /// Grade derived from the score.
    pub grade: LetterGrade,
    /// Assets in `CRITICAL` state.
    pub critical_assets: u32,
    /// Assets in `VULNERABLE` state.
    pub vulnerable_assets: u32,
    /// Active threats counted.
    pub active_threats: u32,
    /// Attestation percentage used for the bonus.
    pub policy_attestation_percent: u8,
    /// Bonus points awarded for attestation.
    pub bonus_points: u32,
}

/// Score an entity. Pure and deterministic.
pub fn score_entity(input: &EntityScoreInput) -> EntityScoreResult {
    let critical_assets = input.count(AssetStatus::Critical);
    let vulnerable_assets = input.count(AssetStatus::Vulnerable);
    let active_threats = input.active_threats;
    let bonus_points =
        u32::from(input.policy_attestation_percent / 10) * ATTESTATION_BONUS_PER_DECILE;

    let deductions = i64::from(critical_assets) * CRITICAL_ASSET_PENALTY
        + i64::from(vulnerable_assets) * VULNERABLE_ASSET_PENALTY
        + i64::from(active_threats) * ACTIVE_THREAT_PENALTY;
    let raw = BASE_SCORE - deductions + i64::from(bonus_points);
    let score = raw.clamp(0, 100) as u8;

    EntityScoreResult {
        score,
        grade: LetterGrade::from_score(score),
        critical_assets,
        vulnerable_assets,
        active_threats,
        policy_attestation_percent: input.policy_attestation_percent,
        bonus_points,
    }
}

// ---------------------------------------------------------------------------
// Entity data
// ---------------------------------------------------------------------------

/// A named entity and its scoring inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    /// Upper-case entity name (`MEDSHIELD`, `GLOBAL`, ...).
    pub entity_name: String,
    /// Scoring inputs.
    #[serde(flatten)]
    pub input: EntityScoreInput,
}

impl EntityData {
    /// Baseline asset inventory for a tenant.
    pub fn baseline(tenant: TenantKey) -> Self {
        use AssetStatus::*;
        let (assets, attestation) = match tenant {
            TenantKey::Medshield => (
                vec![
                    AssetRecord::new("ms-cloud-ehr", "Cloud EHR", Secure),
                    AssetRecord::new("ms-telehealth-v3", "Remote Telehealth V3", Vulnerable),
                    AssetRecord::new("ms-inpatient-nodes", "In-Patient Nodes", Secure),
                ],
                92,
            ),
            TenantKey::Vaultbank => (
                vec![
                    AssetRecord::new("vb-hft-engine", "HFT Engine", Secure),
                    AssetRecord::new("vb-swift-core", "SWIFT Core", Critical),
                    AssetRecord::new("vb-ledger-v2", "Customer Ledger V2", Secure),
                ],
                74,
            ),
            TenantKey::Gridcore => (
                vec![
                    AssetRecord::new("gc-substation-v4", "Substation Control V4", Warning),
                    AssetRecord::new("gc-transmission-node", "Transmission Node", Secure),
                    AssetRecord::new("gc-scada-terminal", "SCADA Master Terminal", Vulnerable),
                ],
                86,
            ),
        };
        Self {
            entity_name: tenant.entity_name().to_string(),
            input: EntityScoreInput {
                assets,
                active_threats: 0,
                policy_attestation_percent: attestation,
            },
        }
    }

    /// Score this entity.
    pub fn score(&self) -> EntityScoreResult {
        score_entity(&self.input)
    }
}

/// Combine several entities into a single `GLOBAL` entity.
///
/// Assets are concatenated, threats summed, and attestation averaged with
/// half-up rounding. An empty slice yields zero attestation.
pub fn aggregate_entities(entities: &[EntityData]) -> EntityData {
    let assets = entities
        .iter()
        .flat_map(|e| e.input.assets.iter().cloned())
        .collect();
    let active_threats = entities
        .iter()
        .fold(0u32, |acc, e| acc.saturating_add(e.input.active_threats));
    let n = entities.len() as u64;
    let attestation = if n == 0 {
        0
    } else {
        let sum: u64 = entities
            .iter()
            .map(|e| u64::from(e.input.policy_attestation_percent))
            .sum();
        ((sum * 2 + n) / (2 * n)) as u8
    };

    EntityData {
        entity_name: "GLOBAL".to_string(),
        input: EntityScoreInput {
            assets,
            active_threats,
            policy_attestation_percent: attestation,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(statuses: &[AssetStatus], threats: u32, attestation: u8) -> EntityScoreInput {
        let assets = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| AssetRecord::new(format!("a{i}"), format!("Asset {i}"), *s))
            .collect();
        EntityScoreInput::new(assets, threats, attestation).unwrap()
    }

    #[test]
    fn clean_entity_with_full_attestation_scores_100_a() {
        let result = score_entity(&input(&[AssetStatus::Secure], 0, 100));
        assert_eq!(result.score, 100);
        assert_eq!(result.grade, LetterGrade::A);
        assert_eq!(result.bonus_points, 20);
    }

    #[test]
    fn one_of_each_deduction_scores_55_f() {
        let result = score_entity(&input(
            &[AssetStatus::Critical, AssetStatus::Vulnerable],
            1,
            0,
        ));
        assert_eq!(result.score, 55);
        assert_eq!(result.grade, LetterGrade::F);
        assert_eq!(result.critical_assets, 1);
        assert_eq!(result.vulnerable_assets, 1);
        assert_eq!(result.active_threats, 1);
        assert_eq!(result.bonus_points, 0);
    }

    #[test]
    fn warning_assets_carry_no_deduction() {
        let result = score_entity(&input(&[AssetStatus::Warning; 4], 0, 0));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn score_clamps_at_zero() {
        let result = score_entity(&input(&[AssetStatus::Critical; 10], 5, 0));
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, LetterGrade::F);
    }

    #[test]
    fn attestation_bonus_uses_floor_deciles() {
        assert_eq!(score_entity(&input(&[], 0, 99)).bonus_points, 18);
        assert_eq!(score_entity(&input(&[], 0, 9)).bonus_points, 0);
    }

    #[test]
    fn attestation_above_100_is_rejected() {
        assert_eq!(
            EntityScoreInput::new(vec![], 0, 101),
            Err(ValidationError::PercentOutOfRange(101))
        );
    }

    #[test]
    fn tenant_baselines_score_as_seeded() {
        // 100 - 10 + 18
        assert_eq!(EntityData::baseline(TenantKey::Medshield).score().score, 100);
        // 100 - 15 + 14
        assert_eq!(EntityData::baseline(TenantKey::Vaultbank).score().score, 99);
        // 100 - 10 + 16
        assert_eq!(EntityData::baseline(TenantKey::Gridcore).score().score, 100);
    }

    #[test]
    fn aggregate_concatenates_and_averages() {
        let entities: Vec<EntityData> = TenantKey::ALL.iter().map(|k| EntityData::baseline(*k)).collect();
        let global = aggregate_entities(&entities);
        assert_eq!(global.entity_name, "GLOBAL");
        assert_eq!(global.input.assets.len(), 9);
        // round((92 + 74 + 86) / 3) = round(84.0) = 84
        assert_eq!(global.input.policy_attestation_percent, 84);
        let result = global.score();
        // 100 - 15 - 20 + 16
        assert_eq!(result.score, 81);
        assert_eq!(result.grade, LetterGrade::B);
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        let global = aggregate_entities(&[]);
        assert!(global.input.assets.is_empty());
        assert_eq!(global.input.policy_attestation_percent, 0);
    }

    #[test]
    fn entity_data_serializes_flat() {
        let json = serde_json::to_value(EntityData::baseline(TenantKey::Gridcore)).unwrap();
        assert_eq!(json["entity_name"], "GRIDCORE");
        assert_eq!(json["policy_attestation_percent"], 86);
        assert_eq!(json["assets"][2]["status"], "VULNERABLE");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn status() -> impl Strategy<Value = AssetStatus> {
        prop_oneof![
            Just(AssetStatus::Secure),
            Just(AssetStatus::Warning),
            Just(AssetStatus::Vulnerable),
            Just(AssetStatus::Critical),
        ]
    }

    proptest! {
        /// Scores stay in range, grade agrees with score, and scoring is reproducible.
        #[test]
        fn score_is_bounded_and_deterministic(
            statuses in prop::collection::vec(status(), 0..20),
            threats in 0u32..50,
            attestation in 0u8..=100,
        ) {
            let assets = statuses
                .into_iter()
                .enumerate()
                .map(|(i, s)| AssetRecord::new(i.to_string(), "asset", s))
                .collect();
            let input = EntityScoreInput::new(assets, threats, attestation).unwrap();
            let a = score_entity(&input);
            let b = score_entity(&input);
            prop_assert!(a.score <= 100);
            prop_assert_eq!(a.grade, LetterGrade::from_score(a.score));
            prop_assert_eq!(a, b);
        }
    }
}
