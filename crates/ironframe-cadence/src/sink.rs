//! # Notification and Audit Sink
//!
//! The contract between the cadence engine and whatever stores outbound
//! messages and audit entries. The sink's dispatch history is what makes
//! the engine idempotent: a `(vendor, milestone)` pair that has been
//! recorded once is never dispatched again.
//!
//! ## Atomicity
//!
//! [`NotificationSink::claim_milestone`] is an atomic check-and-insert.
//! Two evaluations racing on the same vendor can both observe "no record"
//! through [`has_dispatch_record`](NotificationSink::has_dispatch_record),
//! but only one of them wins the claim, and only the winner dispatches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use ironframe_core::TenantKey;

use crate::audit::{AuditActionType, AuditEntry};

/// Errors raised by a sink implementation.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The backing store could not be reached or rejected the write.
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),

    /// No outbound message with this identifier.
    #[error("outbound message {0} not found")]
    MessageNotFound(Uuid),
}

// ---------------------------------------------------------------------------
// Milestone
// ---------------------------------------------------------------------------

/// A one-time escalation milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    /// 90-day courtesy reminder; fires when `60 < days <= 90`.
    #[serde(rename = "90")]
    Day90,
    /// 60-day document update request; fires when `30 < days <= 60`.
    #[serde(rename = "60")]
    Day60,
    /// 30-day stakeholder escalation; fires when `0 < days <= 30`.
    #[serde(rename = "30")]
    Day30,
}

impl Milestone {
    /// Milestones in ascending urgency, the order the engine processes them.
    pub const ALL: [Milestone; 3] = [Self::Day90, Self::Day60, Self::Day30];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day90 => "90",
            Self::Day60 => "60",
            Self::Day30 => "30",
        }
    }

    /// Whether `days` falls in this milestone's firing window.
    pub fn window_contains(&self, days: i64) -> bool {
        match self {
            Self::Day90 => days > 60 && days <= 90,
            Self::Day60 => days > 30 && days <= 60,
            Self::Day30 => days > 0 && days <= 30,
        }
    }

    /// Dispatch channel for this milestone.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Day90 => Channel::Cadence90Vendor,
            Self::Day60 => Channel::VendorDocRequest,
            Self::Day30 => Channel::Cadence30Stakeholder,
        }
    }

    /// Dispatch priority for this milestone.
    pub fn priority(&self) -> Priority {
        match self {
            Self::Day90 => Priority::Low,
            Self::Day60 => Priority::Normal,
            Self::Day30 => Priority::High,
        }
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Milestone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "90" => Ok(Self::Day90),
            "60" => Ok(Self::Day60),
            "30" => Ok(Self::Day30),
            other => Err(format!("unknown cadence milestone: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Message attributes
// ---------------------------------------------------------------------------

/// Delivery channel tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    /// 90-day reminder to the vendor.
    #[serde(rename = "CADENCE_90_VENDOR")]
    Cadence90Vendor,
    /// 60-day document update request to the vendor.
    VendorDocRequest,
    /// 30-day escalation to an internal stakeholder.
    #[serde(rename = "CADENCE_30_STAKEHOLDER")]
    Cadence30Stakeholder,
}

impl Channel {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cadence90Vendor => "CADENCE_90_VENDOR",
            Self::VendorDocRequest => "VENDOR_DOC_REQUEST",
            Self::Cadence30Stakeholder => "CADENCE_30_STAKEHOLDER",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CADENCE_90_VENDOR" => Ok(Self::Cadence90Vendor),
            "VENDOR_DOC_REQUEST" => Ok(Self::VendorDocRequest),
            "CADENCE_30_STAKEHOLDER" => Ok(Self::Cadence30Stakeholder),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Courtesy.
    Low,
    /// Routine.
    Normal,
    /// Escalation.
    High,
}

impl Priority {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "NORMAL" => Ok(Self::Normal),
            "HIGH" => Ok(Self::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Read-receipt state of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadStatus {
    /// Not yet read.
    Pending,
    /// Recipient acknowledged.
    Acknowledged,
}

impl ReadStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Acknowledged => "ACKNOWLEDGED",
        }
    }
}

impl std::str::FromStr for ReadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACKNOWLEDGED" => Ok(Self::Acknowledged),
            other => Err(format!("unknown read status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A message the engine asks the sink to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Vendor the message concerns.
    pub vendor_name: String,
    /// Entity owning the vendor.
    pub associated_entity: String,
    /// Milestone that triggered it.
    pub milestone: Milestone,
    /// Delivery address.
    pub recipient_email: String,
    /// Recipient title as shown in the outbound log.
    pub recipient_title: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Whether a read receipt is requested.
    pub require_read_receipt: bool,
    /// Dispatch instant.
    pub sent_at: DateTime<Utc>,
}

/// A persisted outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessageRecord {
    /// Message identifier.
    pub id: Uuid,
    /// Dispatch instant.
    pub sent_at: DateTime<Utc>,
    /// Delivery address.
    pub recipient_email: String,
    /// Recipient title.
    pub recipient_title: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Delivery channel.
    pub channel: Channel,
    /// Priority.
    pub priority: Priority,
    /// Whether a read receipt was requested.
    pub require_read_receipt: bool,
    /// Vendor the message concerns, for cadence messages.
    pub vendor_name: Option<String>,
    /// Entity owning that vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_entity: Option<String>,
    /// Milestone that triggered the message, for cadence messages.
    pub cadence_milestone: Option<Milestone>,
    /// Read-receipt state.
    pub read_status: ReadStatus,
    /// When the recipient acknowledged.
    pub read_at: Option<DateTime<Utc>>,
}

impl OutboundMessageRecord {
    /// Build the record for a dispatch request.
    pub fn from_request(request: DispatchRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            sent_at: request.sent_at,
            recipient_email: request.recipient_email,
            recipient_title: request.recipient_title,
            subject: request.subject,
            body: request.body,
            channel: request.milestone.channel(),
            priority: request.milestone.priority(),
            require_read_receipt: request.require_read_receipt,
            vendor_name: Some(request.vendor_name),
            associated_entity: Some(request.associated_entity),
            cadence_milestone: Some(request.milestone),
            read_status: ReadStatus::Pending,
            read_at: None,
        }
    }

    /// The tenant this message belongs to, if it names a known entity.
    pub fn tenant(&self) -> Option<TenantKey> {
        self.associated_entity.as_deref()?.parse().ok()
    }

    /// Whether this record is the dispatch of `milestone` for `vendor_name`.
    pub fn is_dispatch_of(&self, vendor_name: &str, milestone: Milestone) -> bool {
        self.cadence_milestone == Some(milestone) && self.vendor_name.as_deref() == Some(vendor_name)
    }
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// Storage for outbound messages, milestone claims, and audit entries.
pub trait NotificationSink {
    /// Whether a message for `(vendor_name, milestone)` has ever been recorded
    /// or claimed.
    fn has_dispatch_record(&self, vendor_name: &str, milestone: Milestone)
        -> Result<bool, SinkError>;

    /// Atomically claim `(vendor_name, milestone)`.
    ///
    /// Returns `true` for exactly one caller per pair; every later call,
    /// and every call after a matching record exists, returns `false`.
    fn claim_milestone(&self, vendor_name: &str, milestone: Milestone) -> Result<bool, SinkError>;

    /// Drop a claim whose dispatch never got recorded, so a later
    /// evaluation can fire the milestone.
    fn release_milestone(&self, vendor_name: &str, milestone: Milestone) -> Result<(), SinkError>;

    /// Record one outbound message.
    fn record_dispatch(&self, request: DispatchRequest)
        -> Result<OutboundMessageRecord, SinkError>;

    /// Append one entry to the audit log.
    fn append_audit_entry(
        &self,
        action_type: AuditActionType,
        associated_entity: Option<&str>,
        description: &str,
        at: DateTime<Utc>,
    ) -> Result<AuditEntry, SinkError>;
}
