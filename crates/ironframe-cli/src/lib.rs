//! # ironframe-cli — CLI Tool for Ironframe
//!
//! Provides the `ironframe` command-line interface over the scoring and
//! cadence crates. Inputs are JSON or YAML files; results are printed as
//! pretty JSON on stdout.
//!
//! ## Subcommands
//!
//! - `ironframe classify` — classify an exposure against a threshold.
//! - `ironframe score-entity` — score an entity's security posture.
//! - `ironframe vendor-health` — score a vendor's health.
//! - `ironframe cadence` — evaluate vendor cadence against a state file,
//!   acknowledge messages, list unresponsive requests, verify the audit chain.
//!
//! ## Exit codes
//!
//! `0` success, `1` domain failure (invalid input, broken audit chain,
//! unknown message), `2` operational error (unreadable or malformed file).
//!
//! ```bash
//! ironframe classify --exposure-cents 702000000 --threshold-cents 1110000000
//! ironframe --config cadence.yaml cadence evaluate vendors.yaml --state cadence-state.json
//! ```

pub mod cadence;
pub mod score;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ironframe_cadence::CadenceConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a JSON or YAML document. `.json` files are parsed as JSON,
/// everything else as YAML.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML: {}", path.display()))
    }
}

/// Load the cadence configuration, or the defaults when no path is given.
pub fn load_cadence_config(path: Option<&Path>) -> Result<CadenceConfig> {
    match path {
        Some(path) => CadenceConfig::load(path)
            .with_context(|| format!("failed to load cadence config: {}", path.display())),
        None => {
            tracing::debug!("no --config given; using default cadence configuration");
            Ok(CadenceConfig::default())
        }
    }
}

/// Resolve `--now`, defaulting to the current time.
pub fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(value) => ironframe_core::parse_instant(value)
            .with_context(|| format!("invalid --now value {value:?}")),
        None => Ok(Utc::now()),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}
