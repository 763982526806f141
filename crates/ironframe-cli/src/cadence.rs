//! # Cadence Subcommand
//!
//! File-backed cadence evaluation. The outbound log and audit chain live in
//! a JSON state file (`--state`), so repeated runs against the same file
//! keep the one-dispatch-per-milestone guarantee.
//!
//! ```bash
//! ironframe --config cadence.yaml cadence evaluate vendors.yaml --state state.json
//! ironframe cadence ack <MESSAGE_ID> --state state.json
//! ironframe cadence unresponsive --state state.json
//! ironframe cadence verify-audit --state state.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use ironframe_cadence::{
    evaluate_cadence, AuditEntry, InMemorySink, OutboundMessageRecord, SinkError, VendorRecord,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arguments for `ironframe cadence`.
#[derive(Args, Debug)]
pub struct CadenceArgs {
    #[command(subcommand)]
    pub command: CadenceCommand,
}

/// Cadence operations.
#[derive(Subcommand, Debug)]
pub enum CadenceCommand {
    /// Evaluate a vendor list and dispatch due milestone messages.
    Evaluate {
        /// Vendor list (JSON or YAML).
        #[arg(value_name = "VENDORS")]
        vendors: PathBuf,

        /// State file holding the outbound log and audit chain.
        /// Created if absent; without it the run is a dry run.
        #[arg(long)]
        state: Option<PathBuf>,

        /// Evaluation instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
        #[arg(long)]
        now: Option<String>,
    },

    /// Record a read receipt for an outbound message.
    Ack {
        /// Outbound message ID.
        #[arg(value_name = "MESSAGE_ID")]
        id: Uuid,

        /// State file holding the outbound log and audit chain.
        #[arg(long)]
        state: PathBuf,

        /// Acknowledgement instant. Defaults to now.
        #[arg(long)]
        now: Option<String>,
    },

    /// List vendor document requests still unread after 48 hours.
    Unresponsive {
        /// State file holding the outbound log.
        #[arg(long)]
        state: PathBuf,

        /// Reference instant. Defaults to now.
        #[arg(long)]
        now: Option<String>,
    },

    /// Verify the audit hash chain.
    VerifyAudit {
        /// State file holding the audit chain.
        #[arg(long)]
        state: PathBuf,
    },
}

/// Persisted cadence state.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CadenceStateFile {
    /// Outbound messages, oldest first.
    #[serde(default)]
    pub outbound: Vec<OutboundMessageRecord>,
    /// Audit entries in chain order.
    #[serde(default)]
    pub audit: Vec<AuditEntry>,
}

impl CadenceStateFile {
    /// Load a state file. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "state file absent; starting empty");
            return Ok(Self::default());
        }
        crate::read_document(path)
    }

    /// Write the state file as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("failed to write state file: {}", path.display()))
    }

    fn into_sink(self) -> InMemorySink {
        let sink = InMemorySink::new();
        sink.hydrate(self.outbound, Vec::new(), self.audit);
        sink
    }

    fn from_sink(sink: &InMemorySink) -> Self {
        Self {
            outbound: sink.outbound(),
            audit: sink.audit_entries(),
        }
    }
}

/// Execute the cadence subcommand.
///
/// Returns exit code: 0 on success, 1 for an unknown message or a broken
/// audit chain.
pub fn run_cadence(args: &CadenceArgs, config_path: Option<&Path>) -> Result<u8> {
    match &args.command {
        CadenceCommand::Evaluate {
            vendors,
            state,
            now,
        } => {
            let config = crate::load_cadence_config(config_path)?;
            let now = crate::resolve_now(now.as_deref())?;
            let vendors: Vec<VendorRecord> = crate::read_document(vendors)?;
            let sink = match state {
                Some(path) => CadenceStateFile::load(path)?.into_sink(),
                None => InMemorySink::new(),
            };

            let evaluation = evaluate_cadence(&vendors, &config, &sink, now)
                .context("cadence evaluation failed")?;
            if let Some(path) = state {
                CadenceStateFile::from_sink(&sink).save(path)?;
            }
            crate::print_json(&evaluation)?;
            Ok(0)
        }
        CadenceCommand::Ack { id, state, now } => {
            let now = crate::resolve_now(now.as_deref())?;
            let sink = CadenceStateFile::load(state)?.into_sink();
            match sink.acknowledge(*id, now) {
                Ok(message) => {
                    CadenceStateFile::from_sink(&sink).save(state)?;
                    crate::print_json(&message)?;
                    Ok(0)
                }
                Err(e @ SinkError::MessageNotFound(_)) => {
                    eprintln!("error: {e}");
                    Ok(1)
                }
                Err(e) => Err(e).context("failed to record read receipt"),
            }
        }
        CadenceCommand::Unresponsive { state, now } => {
            let now = crate::resolve_now(now.as_deref())?;
            let sink = CadenceStateFile::load(state)?.into_sink();
            crate::print_json(&sink.unresponsive_vendor_requests(now))?;
            Ok(0)
        }
        CadenceCommand::VerifyAudit { state } => {
            let sink = CadenceStateFile::load(state)?.into_sink();
            let integrity = sink.verify_audit_chain();
            crate::print_json(&integrity)?;
            if integrity.chain_valid {
                Ok(0)
            } else {
                tracing::error!(broken_links = integrity.broken_links, "audit chain is broken");
                Ok(1)
            }
        }
    }
}
