//! # Audit Log — Immutable Hash Chain
//!
//! Every outbound dispatch, read receipt, and tenant isolation violation
//! appends an entry whose SHA-256 hash chains to the previous entry's hash.
//! The first entry chains to the zero hash. Editing or removing an entry
//! breaks every later link, which [`AuditLog::verify_chain`] reports.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use ironframe_core::TenantKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash the first entry chains to.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ---------------------------------------------------------------------------
// AuditActionType
// ---------------------------------------------------------------------------

/// Kind of audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditActionType {
    /// A cadence message was dispatched.
    EmailSent,
    /// An outbound message was acknowledged by its recipient.
    ReadReceipt,
    /// A cross-tenant read was denied.
    TenantIsolationViolation,
}

impl AuditActionType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailSent => "EMAIL_SENT",
            Self::ReadReceipt => "READ_RECEIPT",
            Self::TenantIsolationViolation => "TENANT_ISOLATION_VIOLATION",
        }
    }
}

impl std::fmt::Display for AuditActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_SENT" => Ok(Self::EmailSent),
            "READ_RECEIPT" => Ok(Self::ReadReceipt),
            "TENANT_ISOLATION_VIOLATION" => Ok(Self::TenantIsolationViolation),
            other => Err(format!("unknown audit action type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditEntry
// ---------------------------------------------------------------------------

/// One link in the audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// What kind of action.
    pub action_type: AuditActionType,
    /// Entity (`MEDSHIELD`, `VAULTBANK`, `GRIDCORE`) the action concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_entity: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Hash of the preceding entry, or [`GENESIS_HASH`].
    pub previous_hash: String,
    /// SHA-256 over this entry's content and `previous_hash`.
    pub entry_hash: String,
}

impl AuditEntry {
    /// Recompute the hash this entry should carry.
    pub fn compute_hash(&self) -> String {
        entry_hash(
            &self.previous_hash,
            self.id,
            self.timestamp,
            self.action_type,
            self.associated_entity.as_deref(),
            &self.description,
        )
    }

    /// The tenant this entry belongs to, if it names a known entity.
    pub fn tenant(&self) -> Option<TenantKey> {
        self.associated_entity.as_deref()?.parse().ok()
    }
}

fn entry_hash(
    previous_hash: &str,
    id: Uuid,
    timestamp: DateTime<Utc>,
    action_type: AuditActionType,
    associated_entity: Option<&str>,
    description: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(id.as_bytes());
    hasher.update(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());
    hasher.update(action_type.as_str().as_bytes());
    hasher.update(associated_entity.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(description.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// AuditLog
// ---------------------------------------------------------------------------

/// Result of [`AuditLog::verify_chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIntegrity {
    /// Entries checked.
    pub total_entries: usize,
    /// Entries whose hash or back-link does not match.
    pub broken_links: usize,
    /// `broken_links == 0`.
    pub chain_valid: bool,
}

/// Append-only, hash-chained audit log.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries, oldest first.
    ///
    /// Entries are taken as-is; call [`verify_chain`](Self::verify_chain) to
    /// check them.
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry chained to the current head.
    ///
    /// The timestamp is truncated to microseconds so the hash survives a
    /// round trip through Postgres `TIMESTAMPTZ`.
    pub fn append(
        &mut self,
        action_type: AuditActionType,
        associated_entity: Option<&str>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> &AuditEntry {
        let timestamp = timestamp.trunc_subsecs(6);
        let previous_hash = self.head_hash().to_string();
        let id = Uuid::new_v4();
        let description = description.into();
        let entry_hash = entry_hash(
            &previous_hash,
            id,
            timestamp,
            action_type,
            associated_entity,
            &description,
        );
        self.entries.push(AuditEntry {
            id,
            timestamp,
            action_type,
            associated_entity: associated_entity.map(String::from),
            description,
            previous_hash,
            entry_hash,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Hash of the newest entry, or [`GENESIS_HASH`] when empty.
    pub fn head_hash(&self) -> &str {
        self.entries
            .last()
            .map(|e| e.entry_hash.as_str())
            .unwrap_or(GENESIS_HASH)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry's hash and back-link.
    pub fn verify_chain(&self) -> ChainIntegrity {
        let mut broken_links = 0;
        let mut expected_previous = GENESIS_HASH;
        for entry in &self.entries {
            if entry.previous_hash != expected_previous || entry.compute_hash() != entry.entry_hash
            {
                broken_links += 1;
            }
            expected_previous = &entry.entry_hash;
        }
        ChainIntegrity {
            total_entries: self.entries.len(),
            broken_links,
            chain_valid: broken_links == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> AuditLog {
        let mut log = AuditLog::new();
        let at = Utc::now();
        log.append(AuditActionType::EmailSent, Some("VAULTBANK"), "first", at);
        log.append(AuditActionType::ReadReceipt, Some("VAULTBANK"), "second", at);
        log.append(AuditActionType::TenantIsolationViolation, Some("MEDSHIELD"), "third", at);
        log
    }

    #[test]
    fn first_entry_chains_to_genesis() {
        let log = sample_log();
        assert_eq!(log.entries()[0].previous_hash, GENESIS_HASH);
        assert_eq!(log.entries()[1].previous_hash, log.entries()[0].entry_hash);
        assert_eq!(log.head_hash(), log.entries()[2].entry_hash);
    }

    #[test]
    fn intact_chain_verifies() {
        let integrity = sample_log().verify_chain();
        assert_eq!(integrity.total_entries, 3);
        assert!(integrity.chain_valid);
    }

    #[test]
    fn edited_description_breaks_chain() {
        let mut entries = sample_log().entries().to_vec();
        entries[1].description = "rewritten".into();
        let integrity = AuditLog::from_entries(entries).verify_chain();
        assert!(!integrity.chain_valid);
        assert_eq!(integrity.broken_links, 1);
    }

    #[test]
    fn reassigned_entity_breaks_chain() {
        let mut entries = sample_log().entries().to_vec();
        entries[2].associated_entity = Some("GRIDCORE".into());
        let integrity = AuditLog::from_entries(entries).verify_chain();
        assert_eq!(integrity.broken_links, 1);
    }

    #[test]
    fn entry_tenant_follows_entity() {
        let log = sample_log();
        assert_eq!(log.entries()[0].tenant(), Some(TenantKey::Vaultbank));
        assert_eq!(log.entries()[2].tenant(), Some(TenantKey::Medshield));
    }

    #[test]
    fn removed_entry_breaks_chain() {
        let mut entries = sample_log().entries().to_vec();
        entries.remove(1);
        let integrity = AuditLog::from_entries(entries).verify_chain();
        assert_eq!(integrity.broken_links, 1);
    }

    #[test]
    fn action_type_round_trips_wire_name() {
        for action in [
            AuditActionType::EmailSent,
            AuditActionType::ReadReceipt,
            AuditActionType::TenantIsolationViolation,
        ] {
            assert_eq!(action.as_str().parse::<AuditActionType>().unwrap(), action);
        }
        assert!("DELETED".parse::<AuditActionType>().is_err());
    }
}
