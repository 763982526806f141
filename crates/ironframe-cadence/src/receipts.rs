//! Read-receipt follow-up.

use chrono::{DateTime, Duration, Utc};

use crate::sink::{Channel, OutboundMessageRecord, ReadStatus};

/// Hours after dispatch before an unread vendor request counts as unresponsive.
pub const UNRESPONSIVE_AFTER_HOURS: i64 = 48;

/// Vendor document requests still `PENDING` at least 48 hours after dispatch.
pub fn unresponsive_vendor_requests(
    messages: &[OutboundMessageRecord],
    now: DateTime<Utc>,
) -> Vec<OutboundMessageRecord> {
    let cutoff = Duration::hours(UNRESPONSIVE_AFTER_HOURS);
    messages
        .iter()
        .filter(|m| {
            m.channel == Channel::VendorDocRequest
                && m.vendor_name.is_some()
                && m.read_status == ReadStatus::Pending
                && now - m.sent_at >= cutoff
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DispatchRequest, Milestone};

    fn message(milestone: Milestone, sent_at: DateTime<Utc>) -> OutboundMessageRecord {
        OutboundMessageRecord::from_request(DispatchRequest {
            vendor_name: "Stripe".into(),
            associated_entity: "VAULTBANK".into(),
            milestone,
            recipient_email: "stripe@vendors.ironframe.local".into(),
            recipient_title: "Vendor Compliance Contact".into(),
            subject: "Document Update Request // Stripe".into(),
            body: String::new(),
            require_read_receipt: true,
            sent_at,
        })
    }

    #[test]
    fn only_stale_pending_document_requests_are_listed() {
        let now = Utc::now();
        let stale = message(Milestone::Day60, now - Duration::hours(48));
        let fresh = message(Milestone::Day60, now - Duration::hours(47));
        let reminder = message(Milestone::Day90, now - Duration::hours(72));
        let mut acked = message(Milestone::Day60, now - Duration::hours(96));
        acked.read_status = ReadStatus::Acknowledged;

        let listed = unresponsive_vendor_requests(
            &[stale.clone(), fresh, reminder, acked],
            now,
        );
        assert_eq!(listed, vec![stale]);
    }
}
