//! # In-Memory Sink
//!
//! A [`NotificationSink`] backed by a single `parking_lot::Mutex`. Claim,
//! record, and audit writes each happen under the lock, so the
//! check-and-insert in [`claim_milestone`](NotificationSink::claim_milestone)
//! is atomic across threads sharing the sink.
//!
//! When built with [`InMemorySink::with_outbox`], every message, audit
//! entry, and read receipt is also queued as a [`SinkChange`] for a durable
//! store to drain and persist. Claims are not queued: a durable store takes
//! its own claim before the engine dispatches.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::audit::{AuditActionType, AuditEntry, AuditLog, ChainIntegrity};
use crate::receipts::unresponsive_vendor_requests;
use crate::sink::{
    DispatchRequest, Milestone, NotificationSink, OutboundMessageRecord, ReadStatus, SinkError,
};

/// A mutation waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkChange {
    /// A message was recorded.
    Message(OutboundMessageRecord),
    /// An audit entry was appended.
    Audit(AuditEntry),
    /// A message was acknowledged.
    Acknowledged {
        /// Message identifier.
        id: Uuid,
        /// Acknowledgement instant.
        read_at: DateTime<Utc>,
    },
}

#[derive(Debug, Default)]
struct SinkState {
    outbound: Vec<OutboundMessageRecord>,
    claims: HashSet<(String, Milestone)>,
    audit: AuditLog,
    outbox: Option<Vec<SinkChange>>,
}

impl SinkState {
    fn queue(&mut self, change: SinkChange) {
        if let Some(outbox) = self.outbox.as_mut() {
            outbox.push(change);
        }
    }

    fn has_record(&self, vendor_name: &str, milestone: Milestone) -> bool {
        self.claims
            .contains(&(vendor_name.to_string(), milestone))
            || self
                .outbound
                .iter()
                .any(|m| m.is_dispatch_of(vendor_name, milestone))
    }
}

/// Thread-safe in-memory outbound log, claim set, and audit chain.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    state: Arc<Mutex<SinkState>>,
}

impl InMemorySink {
    /// Create an empty sink that does not track changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink that queues every change for
    /// [`drain_changes`](Self::drain_changes).
    pub fn with_outbox() -> Self {
        let sink = Self::default();
        sink.state.lock().outbox = Some(Vec::new());
        sink
    }

    /// Load previously persisted state. Claims are also derived from the
    /// messages so a record without a stored claim still blocks redispatch.
    /// Loaded data is not queued as changes.
    pub fn hydrate(
        &self,
        messages: Vec<OutboundMessageRecord>,
        claims: Vec<(String, Milestone)>,
        audit_entries: Vec<AuditEntry>,
    ) {
        let mut state = self.state.lock();
        state.claims.extend(claims);
        for message in &messages {
            if let (Some(vendor), Some(milestone)) = (&message.vendor_name, message.cadence_milestone)
            {
                state.claims.insert((vendor.clone(), milestone));
            }
        }
        state.outbound = messages;
        state.audit = AuditLog::from_entries(audit_entries);
    }

    /// Take every queued change, oldest first.
    pub fn drain_changes(&self) -> Vec<SinkChange> {
        self.state
            .lock()
            .outbox
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Put a drained batch back ahead of anything queued since, so a failed
    /// write is retried in its original order.
    pub fn requeue_changes(&self, mut batch: Vec<SinkChange>) {
        let mut state = self.state.lock();
        if let Some(outbox) = state.outbox.as_mut() {
            batch.append(outbox);
            *outbox = batch;
        }
    }

    /// All outbound messages, oldest first.
    pub fn outbound(&self) -> Vec<OutboundMessageRecord> {
        self.state.lock().outbound.clone()
    }

    /// One outbound message.
    pub fn message(&self, id: Uuid) -> Option<OutboundMessageRecord> {
        self.state.lock().outbound.iter().find(|m| m.id == id).cloned()
    }

    /// All audit entries, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().audit.entries().to_vec()
    }

    /// Verify the audit hash chain.
    pub fn verify_audit_chain(&self) -> ChainIntegrity {
        self.state.lock().audit.verify_chain()
    }

    /// Record a read receipt.
    ///
    /// A pending message becomes `ACKNOWLEDGED` with `read_at = at` and a
    /// `READ_RECEIPT` audit entry is appended. Acknowledging an already
    /// acknowledged message returns it unchanged.
    pub fn acknowledge(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<OutboundMessageRecord, SinkError> {
        let mut state = self.state.lock();
        let message = state
            .outbound
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(SinkError::MessageNotFound(id))?;
        if message.read_status == ReadStatus::Acknowledged {
            return Ok(message.clone());
        }
        message.read_status = ReadStatus::Acknowledged;
        message.read_at = Some(at);
        let updated = message.clone();

        let description = format!(
            "Read receipt: {} -> {} ({})",
            updated.subject, updated.recipient_title, updated.recipient_email
        );
        let entity = updated.associated_entity.clone();
        let entry = state
            .audit
            .append(AuditActionType::ReadReceipt, entity.as_deref(), description, at)
            .clone();
        state.queue(SinkChange::Acknowledged { id, read_at: at });
        state.queue(SinkChange::Audit(entry));
        Ok(updated)
    }

    /// Vendor document requests still unread 48 hours after dispatch.
    pub fn unresponsive_vendor_requests(&self, now: DateTime<Utc>) -> Vec<OutboundMessageRecord> {
        unresponsive_vendor_requests(&self.state.lock().outbound, now)
    }
}

impl NotificationSink for InMemorySink {
    fn has_dispatch_record(
        &self,
        vendor_name: &str,
        milestone: Milestone,
    ) -> Result<bool, SinkError> {
        Ok(self.state.lock().has_record(vendor_name, milestone))
    }

    fn claim_milestone(&self, vendor_name: &str, milestone: Milestone) -> Result<bool, SinkError> {
        let mut state = self.state.lock();
        if state.has_record(vendor_name, milestone) {
            return Ok(false);
        }
        state.claims.insert((vendor_name.to_string(), milestone));
        Ok(true)
    }

    fn release_milestone(&self, vendor_name: &str, milestone: Milestone) -> Result<(), SinkError> {
        self.state
            .lock()
            .claims
            .remove(&(vendor_name.to_string(), milestone));
        Ok(())
    }

    fn record_dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<OutboundMessageRecord, SinkError> {
        let record = OutboundMessageRecord::from_request(request);
        let mut state = self.state.lock();
        state.outbound.push(record.clone());
        state.queue(SinkChange::Message(record.clone()));
        Ok(record)
    }

    fn append_audit_entry(
        &self,
        action_type: AuditActionType,
        associated_entity: Option<&str>,
        description: &str,
        at: DateTime<Utc>,
    ) -> Result<AuditEntry, SinkError> {
        let mut state = self.state.lock();
        let entry = state
            .audit
            .append(action_type, associated_entity, description, at)
            .clone();
        state.queue(SinkChange::Audit(entry.clone()));
        Ok(entry)
    }
}
