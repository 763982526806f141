//! # Cadence Configuration
//!
//! Milestone toggles, the company stakeholders that receive 30-day
//! escalations, and the vendor document-request template. Loaded from YAML
//! or JSON; every field has a default so a partial file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sink::Milestone;

/// Template sent with the 60-day document update request when none is configured.
pub const DEFAULT_VENDOR_EVIDENCE_REQUEST_TEMPLATE: &str = "NIST 800-53 Evidence Request: \
Please provide updated control evidence, attestation artifacts, and remediation status for \
your assigned controls within 48 hours.";

/// Mail domain for derived vendor contact addresses.
pub const DEFAULT_VENDOR_MAIL_DOMAIN: &str = "vendors.ironframe.local";

/// Errors loading a cadence configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read cadence config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// YAML parse failure.
    #[error("invalid YAML cadence config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse failure.
    #[error("invalid JSON cadence config: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

fn enabled() -> bool {
    true
}

/// Per-milestone enable switches. All default to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceAlertToggles {
    /// 90-day courtesy reminder to the vendor.
    #[serde(default = "enabled")]
    pub day_90: bool,
    /// 60-day document update request to the vendor.
    #[serde(default = "enabled")]
    pub day_60: bool,
    /// 30-day escalation to internal stakeholders.
    #[serde(default = "enabled")]
    pub day_30: bool,
}

impl CadenceAlertToggles {
    /// Whether `milestone` is switched on.
    pub fn is_enabled(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Day90 => self.day_90,
            Milestone::Day60 => self.day_60,
            Milestone::Day30 => self.day_30,
        }
    }
}

impl Default for CadenceAlertToggles {
    fn default() -> Self {
        Self {
            day_90: true,
            day_60: true,
            day_30: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Stakeholders
// ---------------------------------------------------------------------------

/// Internal role that receives 30-day escalations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRole {
    /// Chief Information Security Officer.
    Ciso,
    /// General or legal counsel.
    LegalCounsel,
}

impl EscalationRole {
    /// Every role a 30-day escalation is routed to, in dispatch order.
    pub const ALL: [EscalationRole; 2] = [Self::Ciso, Self::LegalCounsel];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ciso => "ciso",
            Self::LegalCounsel => "legal_counsel",
        }
    }

    /// Case-insensitive substring match against a job title.
    pub fn matches_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        match self {
            Self::Ciso => title.contains("ciso"),
            Self::LegalCounsel => {
                title.contains("general counsel") || title.contains("legal counsel")
            }
        }
    }
}

impl std::fmt::Display for EscalationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company stakeholder who may receive escalations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyStakeholder {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Job title.
    pub title: String,
    /// Delivery address. A blank address never receives escalations.
    #[serde(default)]
    pub email: String,
    /// Department.
    #[serde(default)]
    pub department: String,
    /// Explicit escalation role. When present it replaces title matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<EscalationRole>,
}

impl CompanyStakeholder {
    /// Whether this stakeholder should receive escalations for `role`.
    pub fn fills(&self, role: EscalationRole) -> bool {
        if self.email.trim().is_empty() {
            return false;
        }
        match self.role {
            Some(explicit) => explicit == role,
            None => role.matches_title(&self.title),
        }
    }
}

// ---------------------------------------------------------------------------
// CadenceConfig
// ---------------------------------------------------------------------------

fn default_template() -> String {
    DEFAULT_VENDOR_EVIDENCE_REQUEST_TEMPLATE.to_string()
}

fn default_domain() -> String {
    DEFAULT_VENDOR_MAIL_DOMAIN.to_string()
}

/// Configuration for [`evaluate_cadence`](crate::evaluate_cadence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Milestone switches.
    #[serde(default)]
    pub cadence_alerts: CadenceAlertToggles,
    /// Escalation recipients, in priority order.
    #[serde(default)]
    pub company_stakeholders: Vec<CompanyStakeholder>,
    /// Body of the 60-day document update request.
    #[serde(default = "default_template")]
    pub vendor_document_update_template: String,
    /// Domain for derived vendor contact addresses.
    #[serde(default = "default_domain")]
    pub vendor_mail_domain: String,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            cadence_alerts: CadenceAlertToggles::default(),
            company_stakeholders: Vec::new(),
            vendor_document_update_template: default_template(),
            vendor_mail_domain: default_domain(),
        }
    }
}

impl CadenceConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file. `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// The first stakeholder filling `role`, if any.
    pub fn stakeholder_for(&self, role: EscalationRole) -> Option<&CompanyStakeholder> {
        self.company_stakeholders.iter().find(|s| s.fills(role))
    }

    /// The template to send, falling back to the default when blank.
    pub fn document_update_template(&self) -> &str {
        let template = self.vendor_document_update_template.trim();
        if template.is_empty() {
            DEFAULT_VENDOR_EVIDENCE_REQUEST_TEMPLATE
        } else {
            template
        }
    }
}
