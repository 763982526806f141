//! # Tenant Isolation Guard
//!
//! Every tenant-scoped read (HTTP request path, financial exposure lookup,
//! vendor or asset read) passes through [`assert_tenant_access`] before any
//! data is returned.
//!
//! ## Security Invariant
//!
//! The guard fails closed. Absence of an active tenant never grants access
//! to a *named* tenant; it only grants access when no specific tenant was
//! requested at all.
//!
//! Tenant context is never inferred from user-supplied free text. A
//! [`TenantContext`] is built from a [`TenantKey`], and `TenantKey` only
//! parses the fixed set of known tenant slugs and identifiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IronframeError, ValidationError};

// ---------------------------------------------------------------------------
// TenantId
// ---------------------------------------------------------------------------

/// Opaque, stable identifier of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TenantKey
// ---------------------------------------------------------------------------

/// The closed enumeration of tenants served by this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantKey {
    /// Healthcare tenant.
    Medshield,
    /// Financial services tenant.
    Vaultbank,
    /// Energy / critical infrastructure tenant.
    Gridcore,
}

impl TenantKey {
    /// All known tenants, in display order.
    pub const ALL: [TenantKey; 3] = [Self::Medshield, Self::Vaultbank, Self::Gridcore];

    /// URL slug of this tenant.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Medshield => "medshield",
            Self::Vaultbank => "vaultbank",
            Self::Gridcore => "gridcore",
        }
    }

    /// Upper-case entity name used on vendor and entity records.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Medshield => "MEDSHIELD",
            Self::Vaultbank => "VAULTBANK",
            Self::Gridcore => "GRIDCORE",
        }
    }

    /// Stable tenant identifier.
    pub fn id(&self) -> TenantId {
        let raw = match self {
            Self::Medshield => 0x5c42_0f5a_8f1f_4bbf_b42d_7f8d_d4bb_6a01,
            Self::Vaultbank => 0xc693_2d16_a716_4a07_9bc4_6ec9_87f6_41e2,
            Self::Gridcore => 0x4d1e_a1a4_b6a8_4d12_9eb3_2f0a_64ad_0ef7,
        };
        TenantId(Uuid::from_u128(raw))
    }

    /// Resolve a tenant from its stable identifier.
    pub fn from_id(id: &TenantId) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.id() == *id)
    }
}

impl std::fmt::Display for TenantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TenantKey {
    type Err = ValidationError;

    /// Accepts a known slug or entity name (case-insensitive) or a known
    /// tenant UUID. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(key) = Self::ALL
            .into_iter()
            .find(|key| key.slug().eq_ignore_ascii_case(trimmed))
        {
            return Ok(key);
        }
        Uuid::parse_str(trimmed)
            .ok()
            .and_then(|uuid| Self::from_id(&TenantId(uuid)))
            .ok_or_else(|| ValidationError::UnknownTenant(trimmed.to_string()))
    }
}

/// Detect the tenant addressed by a route path.
///
/// Matches the exact slug path (`/medshield`) or any path beneath it
/// (`/medshield/...`). `/medshieldx` does not match.
pub fn detect_tenant_from_path(path: &str) -> Option<TenantKey> {
    TenantKey::ALL.into_iter().find(|key| {
        path.strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(key.slug()))
            .is_some_and(|tail| tail.is_empty() || tail.starts_with('/'))
    })
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// Decide whether the active tenant may access the target tenant's resource.
///
/// Returns `true` iff no specific tenant is requested (`target` absent or
/// empty), or the active tenant is present and equal to the target.
/// Never panics; callers decide whether `false` is fatal.
pub fn assert_tenant_access(active: Option<&str>, target: Option<&str>) -> bool {
    match target {
        None => true,
        Some(t) if t.is_empty() => true,
        Some(t) => active.is_some_and(|a| !a.is_empty() && a == t),
    }
}

/// Convert a failed guard into [`IronframeError::AccessDenied`].
pub fn require_tenant_access(active: Option<&str>, target: &str) -> Result<(), IronframeError> {
    if assert_tenant_access(active, Some(target)) {
        Ok(())
    } else {
        Err(IronframeError::AccessDenied {
            active: active.filter(|a| !a.is_empty()).unwrap_or("none").to_string(),
            target: target.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// TenantContext
// ---------------------------------------------------------------------------

/// The caller's authorized tenant.
///
/// `active` is `None` when no tenant route is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    active: Option<TenantKey>,
}

impl TenantContext {
    /// Context with no active tenant.
    pub fn none() -> Self {
        Self { active: None }
    }

    /// Context for a known tenant.
    pub fn for_tenant(key: TenantKey) -> Self {
        Self { active: Some(key) }
    }

    /// Context derived from a route path.
    pub fn from_path(path: &str) -> Self {
        Self {
            active: detect_tenant_from_path(path),
        }
    }

    /// The active tenant, if any.
    pub fn active(&self) -> Option<TenantKey> {
        self.active
    }

    /// The active tenant's stable identifier, if any.
    pub fn active_tenant_id(&self) -> Option<TenantId> {
        self.active.map(|key| key.id())
    }

    /// Whether this context may read resources belonging to `target`.
    pub fn can_access(&self, target: TenantKey) -> bool {
        let active = self.active_tenant_id().map(|id| id.to_string());
        let target = target.id().to_string();
        assert_tenant_access(active.as_deref(), Some(&target))
    }

    /// Require access to `target`, failing with `AccessDenied`.
    pub fn require(&self, target: TenantKey) -> Result<(), IronframeError> {
        if self.can_access(target) {
            Ok(())
        } else {
            Err(IronframeError::AccessDenied {
                active: self
                    .active
                    .map(|key| key.slug().to_string())
                    .unwrap_or_else(|| "none".to_string()),
                target: target.slug().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_active_and_no_target_is_allowed() {
        assert!(assert_tenant_access(None, Some("")));
        assert!(assert_tenant_access(None, None));
    }

    #[test]
    fn no_active_with_named_target_is_denied() {
        assert!(!assert_tenant_access(None, Some("tenant-A")));
    }

    #[test]
    fn matching_tenant_is_allowed() {
        assert!(assert_tenant_access(Some("tenant-A"), Some("tenant-A")));
    }

    #[test]
    fn cross_tenant_is_denied() {
        assert!(!assert_tenant_access(Some("tenant-A"), Some("tenant-B")));
    }

    #[test]
    fn empty_active_is_treated_as_absent() {
        assert!(!assert_tenant_access(Some(""), Some("tenant-A")));
    }

    #[test]
    fn require_tenant_access_reports_none() {
        let err = require_tenant_access(None, "tenant-A").unwrap_err();
        match err {
            IronframeError::AccessDenied { active, target } => {
                assert_eq!(active, "none");
                assert_eq!(target, "tenant-A");
            }
            other => panic!("expected AccessDenied, got {other:?}"),
        }
        assert!(require_tenant_access(Some("tenant-A"), "tenant-A").is_ok());
    }

    #[test]
    fn tenant_ids_are_stable() {
        assert_eq!(
            TenantKey::Medshield.id().to_string(),
            "5c420f5a-8f1f-4bbf-b42d-7f8dd4bb6a01"
        );
        assert_eq!(
            TenantKey::Vaultbank.id().to_string(),
            "c6932d16-a716-4a07-9bc4-6ec987f641e2"
        );
        assert_eq!(
            TenantKey::Gridcore.id().to_string(),
            "4d1ea1a4-b6a8-4d12-9eb3-2f0a64ad0ef7"
        );
    }

    #[test]
    fn tenant_key_parses_only_known_values() {
        assert_eq!("medshield".parse::<TenantKey>().unwrap(), TenantKey::Medshield);
        assert_eq!("VAULTBANK".parse::<TenantKey>().unwrap(), TenantKey::Vaultbank);
        assert_eq!(
            "4d1ea1a4-b6a8-4d12-9eb3-2f0a64ad0ef7".parse::<TenantKey>().unwrap(),
            TenantKey::Gridcore
        );
        assert!("acme".parse::<TenantKey>().is_err());
        assert!("00000000-0000-0000-0000-000000000000".parse::<TenantKey>().is_err());
    }

    #[test]
    fn detect_tenant_from_path_requires_segment_boundary() {
        assert_eq!(detect_tenant_from_path("/medshield"), Some(TenantKey::Medshield));
        assert_eq!(detect_tenant_from_path("/gridcore/logs"), Some(TenantKey::Gridcore));
        assert_eq!(detect_tenant_from_path("/medshieldx"), None);
        assert_eq!(detect_tenant_from_path("/vendors"), None);
        assert_eq!(detect_tenant_from_path("vaultbank"), None);
    }

    #[test]
    fn context_guards_cross_tenant_reads() {
        let ctx = TenantContext::for_tenant(TenantKey::Medshield);
        assert!(ctx.can_access(TenantKey::Medshield));
        assert!(!ctx.can_access(TenantKey::Vaultbank));
        assert!(ctx.require(TenantKey::Vaultbank).unwrap_err().is_access_denied());
    }

    #[test]
    fn empty_context_is_denied_for_named_tenant() {
        let ctx = TenantContext::none();
        assert!(!ctx.can_access(TenantKey::Gridcore));
        assert!(TenantContext::from_path("/dashboard").active().is_none());
        assert_eq!(
            TenantContext::from_path("/vaultbank/logs").active(),
            Some(TenantKey::Vaultbank)
        );
    }
}
