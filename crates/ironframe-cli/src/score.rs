//! # Scoring Subcommands
//!
//! `classify`, `score-entity`, and `vendor-health`. All three are pure:
//! the same arguments always print the same result.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use ironframe_core::TenantKey;
use ironframe_risk::{
    aggregate_entities, classify_risk, score_entity, score_vendor_health, EntityData,
    EntityScoreInput, EntityScoreResult, VendorHealthInput,
};
use serde::Serialize;

/// Arguments for `ironframe classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Annualized loss exposure in cents.
    #[arg(long, allow_hyphen_values = true)]
    pub exposure_cents: i64,

    /// Risk threshold in cents.
    #[arg(long, allow_hyphen_values = true)]
    pub threshold_cents: i64,
}

/// Arguments for `ironframe score-entity`.
#[derive(Args, Debug)]
pub struct ScoreEntityArgs {
    /// Entity input file (JSON or YAML): assets, active_threats,
    /// policy_attestation_percent.
    #[arg(value_name = "INPUT", conflicts_with_all = ["tenant", "portfolio"])]
    pub input: Option<PathBuf>,

    /// Score a tenant's built-in baseline instead of a file.
    #[arg(long, conflicts_with = "portfolio")]
    pub tenant: Option<String>,

    /// Score every tenant's baseline aggregated into GLOBAL.
    #[arg(long)]
    pub portfolio: bool,
}

/// Arguments for `ironframe vendor-health`.
#[derive(Args, Debug)]
pub struct VendorHealthArgs {
    /// Vendor health input file (JSON or YAML).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    exposure_cents: i64,
    threshold_cents: i64,
    level: ironframe_risk::RiskLevel,
}

#[derive(Debug, Serialize)]
struct EntityOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_name: Option<String>,
    #[serde(flatten)]
    result: EntityScoreResult,
}

/// Execute `classify`. Returns exit code 1 for out-of-domain amounts.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    match classify_risk(args.exposure_cents, args.threshold_cents) {
        Ok(level) => {
            crate::print_json(&ClassifyOutput {
                exposure_cents: args.exposure_cents,
                threshold_cents: args.threshold_cents,
                level,
            })?;
            Ok(0)
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            Ok(1)
        }
    }
}

/// Execute `score-entity`. Returns exit code 1 when the input fails validation.
pub fn run_score_entity(args: &ScoreEntityArgs) -> Result<u8> {
    let (entity_name, input) = if args.portfolio {
        let entities: Vec<EntityData> =
            TenantKey::ALL.into_iter().map(EntityData::baseline).collect();
        let global = aggregate_entities(&entities);
        (Some(global.entity_name), global.input)
    } else if let Some(tenant) = &args.tenant {
        let Ok(tenant) = tenant.parse::<TenantKey>() else {
            eprintln!("error: unknown tenant {tenant:?}");
            return Ok(1);
        };
        let baseline = EntityData::baseline(tenant);
        (Some(baseline.entity_name), baseline.input)
    } else if let Some(path) = &args.input {
        let input: EntityScoreInput = crate::read_document(path)?;
        (None, input)
    } else {
        bail!("provide an INPUT file, --tenant, or --portfolio");
    };

    if let Err(e) = input.validate() {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        return Ok(1);
    }

    crate::print_json(&EntityOutput {
        entity_name,
        result: score_entity(&input),
    })?;
    Ok(0)
}

/// Execute `vendor-health`.
pub fn run_vendor_health(args: &VendorHealthArgs) -> Result<u8> {
    let input: VendorHealthInput = crate::read_document(&args.input)?;
    crate::print_json(&score_vendor_health(&input))?;
    Ok(0)
}
