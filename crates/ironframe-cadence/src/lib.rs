//! # ironframe-cadence — Compliance Cadence Escalation
//!
//! Turns vendor document-expiration dates into a sequence of one-time,
//! non-duplicated notifications with an audit trail.
//!
//! ## Flow
//!
//! 1. [`vendor`] — each evaluation recomputes the vendor's days until
//!    expiration and its cadence bucket (`90`, `60`, `30`, `OVERDUE`) from
//!    scratch. The bucket stored on the record is a cache, never authoritative.
//!
//! 2. [`engine`] — for each enabled milestone whose window contains the
//!    vendor's days until expiration, the engine claims `(vendor, milestone)`
//!    in the sink and dispatches exactly one message per recipient.
//!
//! 3. [`sink`] — the dispatch history is the source of truth for
//!    idempotence. Running the engine twice never sends twice, because the
//!    check is against persisted history, not engine-local memory.
//!
//! ## Degraded-continue
//!
//! An unparseable expiration date or a missing escalation stakeholder never
//! aborts the batch. Affected vendors and notifications are reported as
//! [`CadenceSkip`]s in the result.

pub mod audit;
pub mod config;
pub mod engine;
pub mod memory;
pub mod receipts;
pub mod sink;
pub mod vendor;

// Re-export primary types.
pub use audit::{AuditActionType, AuditEntry, AuditLog, ChainIntegrity, GENESIS_HASH};
pub use config::{
    CadenceAlertToggles, CadenceConfig, CompanyStakeholder, ConfigError, EscalationRole,
    DEFAULT_VENDOR_EVIDENCE_REQUEST_TEMPLATE, DEFAULT_VENDOR_MAIL_DOMAIN,
};
pub use engine::{
    dispatch_milestone, evaluate_cadence, plan_cadence, CadenceDispatchEvent, CadenceEvaluation,
    CadencePlan, CadenceSkip, PlannedMilestone, SkipReason,
};
pub use memory::{InMemorySink, SinkChange};
pub use receipts::{unresponsive_vendor_requests, UNRESPONSIVE_AFTER_HOURS};
pub use sink::{
    Channel, DispatchRequest, Milestone, NotificationSink, OutboundMessageRecord, Priority,
    ReadStatus, SinkError,
};
pub use vendor::{
    days_until_expiration, CadenceBucket, DaysUntilExpiration, Industry, RiskTier, VendorRecord,
};
