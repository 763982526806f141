//! # Cadence Engine
//!
//! Evaluates every vendor against the configured milestones and dispatches
//! each `(vendor, milestone)` at most once.
//!
//! ## Per-vendor steps
//!
//! 1. Recompute days until expiration and the cadence bucket. An
//!    unparseable date skips the vendor and leaves its cached bucket as is.
//! 2. For each enabled milestone in ascending urgency (90, 60, 30) whose
//!    window contains the day count and that has no dispatch record:
//!    build the messages, claim the milestone, then record each message
//!    and one `EMAIL_SENT` audit entry per message.
//!
//! The 30-day milestone resolves its stakeholders before claiming. A
//! milestone with no reachable recipient is reported as skipped and left
//! unclaimed, so it fires on a later run once a stakeholder is configured.
//!
//! [`evaluate_cadence`] is [`plan_cadence`] followed by
//! [`dispatch_milestone`] for each due milestone. Callers with a durable
//! claim store run the two steps themselves and take the durable claim
//! between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::AuditActionType;
use crate::config::{CadenceConfig, EscalationRole};
use crate::sink::{Channel, DispatchRequest, Milestone, NotificationSink, SinkError};
use crate::vendor::{CadenceBucket, DaysUntilExpiration, VendorRecord};

const VENDOR_CONTACT_TITLE: &str = "Vendor Compliance Contact";

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One message dispatched during an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceDispatchEvent {
    /// Vendor the message concerns.
    pub vendor_name: String,
    /// Milestone that fired.
    pub milestone: Milestone,
    /// Recorded outbound message.
    pub message_id: Uuid,
    /// Recipient title.
    pub recipient_title: String,
    /// Recipient address.
    pub recipient_email: String,
    /// Delivery channel.
    pub channel: Channel,
    /// Dispatch instant.
    pub sent_at: DateTime<Utc>,
}

/// Why a vendor or notification was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The expiration date could not be parsed.
    UnparseableExpiration {
        /// The offending value.
        value: String,
    },
    /// No stakeholder with an email address fills this role.
    NoEscalationStakeholder {
        /// The unfilled role.
        role: EscalationRole,
    },
}

/// A degraded-continue condition reported instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceSkip {
    /// Affected vendor.
    pub vendor_name: String,
    /// Affected milestone, when the skip is narrower than the whole vendor.
    pub milestone: Option<Milestone>,
    /// Cause.
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Output of [`evaluate_cadence`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceEvaluation {
    /// Input vendors with refreshed `current_cadence` and `last_request_sent`.
    pub vendors: Vec<VendorRecord>,
    /// Messages dispatched this run, in dispatch order.
    pub dispatched_events: Vec<CadenceDispatchEvent>,
    /// Vendors and notifications skipped this run.
    pub skipped: Vec<CadenceSkip>,
}

/// A milestone due for one vendor, with its messages built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMilestone {
    /// Vendor the milestone belongs to.
    pub vendor_name: String,
    /// Milestone to fire.
    pub milestone: Milestone,
    /// One request per recipient. Never empty.
    pub requests: Vec<DispatchRequest>,
}

/// Output of [`plan_cadence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CadencePlan {
    /// Input vendors with refreshed `current_cadence`.
    pub vendors: Vec<VendorRecord>,
    /// Milestones to dispatch, in vendor order.
    pub due: Vec<PlannedMilestone>,
    /// Vendors and notifications skipped while planning.
    pub skipped: Vec<CadenceSkip>,
}

impl CadencePlan {
    /// Finish the run with the events that were actually dispatched,
    /// stamping `last_request_sent` on their vendors.
    pub fn into_evaluation(self, dispatched_events: Vec<CadenceDispatchEvent>) -> CadenceEvaluation {
        let mut vendors = self.vendors;
        for event in &dispatched_events {
            if let Some(vendor) = vendors
                .iter_mut()
                .find(|v| v.vendor_name == event.vendor_name)
            {
                vendor.last_request_sent = Some(event.sent_at);
            }
        }
        CadenceEvaluation {
            vendors,
            dispatched_events,
            skipped: self.skipped,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Run one cadence evaluation at `now`.
///
/// Only sink failures abort the run. Bad vendor data and missing
/// stakeholders are reported in [`CadenceEvaluation::skipped`].
pub fn evaluate_cadence<S>(
    vendors: &[VendorRecord],
    config: &CadenceConfig,
    sink: &S,
    now: DateTime<Utc>,
) -> Result<CadenceEvaluation, SinkError>
where
    S: NotificationSink + ?Sized,
{
    let mut plan = plan_cadence(vendors, config, sink, now)?;
    let mut dispatched = Vec::new();
    for planned in std::mem::take(&mut plan.due) {
        dispatched.extend(dispatch_milestone(planned, sink)?);
    }
    let evaluation = plan.into_evaluation(dispatched);

    tracing::debug!(
        vendors = evaluation.vendors.len(),
        dispatched = evaluation.dispatched_events.len(),
        skipped = evaluation.skipped.len(),
        "cadence evaluation complete"
    );
    Ok(evaluation)
}

/// Work out which milestones are due at `now` without dispatching anything.
///
/// A milestone is due when it is enabled, its window contains the vendor's
/// day count, the sink has no record of it, and at least one recipient
/// resolves.
pub fn plan_cadence<S>(
    vendors: &[VendorRecord],
    config: &CadenceConfig,
    sink: &S,
    now: DateTime<Utc>,
) -> Result<CadencePlan, SinkError>
where
    S: NotificationSink + ?Sized,
{
    let mut plan = CadencePlan {
        vendors: Vec::with_capacity(vendors.len()),
        ..CadencePlan::default()
    };

    for record in vendors {
        let mut vendor = record.clone();
        let days = match vendor.days_until_expiration(now) {
            DaysUntilExpiration::Known(days) => days,
            DaysUntilExpiration::Unknown => {
                tracing::warn!(
                    vendor = %vendor.vendor_name,
                    expiration = %vendor.document_expiration_date,
                    "skipping vendor with unparseable expiration date"
                );
                plan.skipped.push(CadenceSkip {
                    vendor_name: vendor.vendor_name.clone(),
                    milestone: None,
                    reason: SkipReason::UnparseableExpiration {
                        value: vendor.document_expiration_date.clone(),
                    },
                });
                plan.vendors.push(vendor);
                continue;
            }
        };
        vendor.current_cadence = CadenceBucket::from_days(days);
        tracing::debug!(
            vendor = %vendor.vendor_name,
            days_until_expiration = days,
            bucket = %vendor.current_cadence,
            "cadence bucket computed"
        );

        for milestone in Milestone::ALL {
            if !config.cadence_alerts.is_enabled(milestone) || !milestone.window_contains(days) {
                continue;
            }
            if sink.has_dispatch_record(&vendor.vendor_name, milestone)? {
                continue;
            }

            let requests =
                plan_dispatches(&vendor, milestone, days, config, now, &mut plan.skipped);
            if requests.is_empty() {
                continue;
            }
            plan.due.push(PlannedMilestone {
                vendor_name: vendor.vendor_name.clone(),
                milestone,
                requests,
            });
        }

        plan.vendors.push(vendor);
    }

    Ok(plan)
}

/// Claim one planned milestone in the sink and record its messages.
///
/// Returns no events when the claim is already held. If recording fails
/// before any message is stored, the claim is released so a later run can
/// fire the milestone; once a message is stored the milestone counts as
/// fired.
pub fn dispatch_milestone<S>(
    planned: PlannedMilestone,
    sink: &S,
) -> Result<Vec<CadenceDispatchEvent>, SinkError>
where
    S: NotificationSink + ?Sized,
{
    let PlannedMilestone {
        vendor_name,
        milestone,
        requests,
    } = planned;

    if !sink.claim_milestone(&vendor_name, milestone)? {
        tracing::debug!(vendor = %vendor_name, milestone = %milestone, "milestone already claimed");
        return Ok(Vec::new());
    }

    let mut events = Vec::with_capacity(requests.len());
    for request in requests {
        let entity = request.associated_entity.clone();
        let record = match sink.record_dispatch(request) {
            Ok(record) => record,
            Err(err) => {
                if events.is_empty() {
                    if let Err(release_err) = sink.release_milestone(&vendor_name, milestone) {
                        tracing::error!(
                            vendor = %vendor_name,
                            milestone = %milestone,
                            error = %release_err,
                            "failed to release milestone claim"
                        );
                    }
                } else {
                    tracing::warn!(
                        vendor = %vendor_name,
                        milestone = %milestone,
                        delivered = events.len(),
                        "milestone partially dispatched"
                    );
                }
                return Err(err);
            }
        };
        let description = format!(
            "{} -> {} ({}) [{}]",
            record.subject, record.recipient_title, record.recipient_email, record.channel
        );
        sink.append_audit_entry(
            AuditActionType::EmailSent,
            Some(&entity),
            &description,
            record.sent_at,
        )?;
        tracing::info!(
            vendor = %vendor_name,
            milestone = %milestone,
            recipient = %record.recipient_email,
            channel = %record.channel,
            "cadence message dispatched"
        );

        events.push(CadenceDispatchEvent {
            vendor_name: vendor_name.clone(),
            milestone,
            message_id: record.id,
            recipient_title: record.recipient_title,
            recipient_email: record.recipient_email,
            channel: record.channel,
            sent_at: record.sent_at,
        });
    }
    Ok(events)
}

fn plan_dispatches(
    vendor: &VendorRecord,
    milestone: Milestone,
    days: i64,
    config: &CadenceConfig,
    now: DateTime<Utc>,
    skipped: &mut Vec<CadenceSkip>,
) -> Vec<DispatchRequest> {
    let name = vendor.vendor_name.as_str();
    let remaining = days.max(0);
    let request = |recipient_email: String, recipient_title: String, subject: String, body: String| {
        DispatchRequest {
            vendor_name: name.to_string(),
            associated_entity: vendor.associated_entity.clone(),
            milestone,
            recipient_email,
            recipient_title,
            subject,
            body,
            require_read_receipt: true,
            sent_at: now,
        }
    };

    match milestone {
        Milestone::Day90 => vec![request(
            vendor.contact_email(&config.vendor_mail_domain),
            VENDOR_CONTACT_TITLE.to_string(),
            format!("Upcoming Expiration (Low Priority) // {name}"),
            format!(
                "Courtesy Reminder: your compliance evidence package expires in {remaining} days. \
                 Please prepare updated artifacts."
            ),
        )],
        Milestone::Day60 => vec![request(
            vendor.contact_email(&config.vendor_mail_domain),
            VENDOR_CONTACT_TITLE.to_string(),
            format!("Document Update Request // {name}"),
            format!(
                "{}\n\nRead receipt required: opening this message is recorded.",
                config.document_update_template()
            ),
        )],
        Milestone::Day30 => EscalationRole::ALL
            .into_iter()
            .filter_map(|role| match config.stakeholder_for(role) {
                Some(stakeholder) => Some(request(
                    stakeholder.email.trim().to_string(),
                    stakeholder.title.clone(),
                    format!("High Priority // 30-Day Vendor Lapse Alert // {name}"),
                    format!(
                        "Vendor {name} evidence expires in {remaining} days. This 30-day \
                         escalation is auto-routed to CISO and Legal Counsel."
                    ),
                )),
                None => {
                    tracing::warn!(
                        vendor = %name,
                        role = %role,
                        "no stakeholder configured for 30-day escalation"
                    );
                    skipped.push(CadenceSkip {
                        vendor_name: name.to_string(),
                        milestone: Some(milestone),
                        reason: SkipReason::NoEscalationStakeholder { role },
                    });
                    None
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CadenceAlertToggles, CompanyStakeholder};
    use crate::memory::InMemorySink;
    use crate::sink::{OutboundMessageRecord, Priority};
    use crate::vendor::{Industry, RiskTier};
    use crate::AuditEntry;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn vendor(name: &str, days: i64) -> VendorRecord {
        VendorRecord {
            vendor_name: name.into(),
            associated_entity: "VAULTBANK".into(),
            industry: Industry::Finance,
            risk_tier: RiskTier::High,
            document_expiration_date: (now() + Duration::days(days)).to_rfc3339(),
            last_request_sent: None,
            current_cadence: CadenceBucket::Ninety,
            compliance_contact_email: None,
        }
    }

    fn stakeholder(id: &str, title: &str, email: &str) -> CompanyStakeholder {
        CompanyStakeholder {
            id: id.into(),
            name: id.into(),
            title: title.into(),
            email: email.into(),
            department: "Executive".into(),
            role: None,
        }
    }

    fn with_stakeholders() -> CadenceConfig {
        CadenceConfig {
            company_stakeholders: vec![
                stakeholder("ciso", "CISO", "ciso@ironframe.local"),
                stakeholder("gc", "General Counsel", "legal@ironframe.local"),
            ],
            ..CadenceConfig::default()
        }
    }

    fn only(milestone: Milestone) -> CadenceConfig {
        CadenceConfig {
            cadence_alerts: CadenceAlertToggles {
                day_90: milestone == Milestone::Day90,
                day_60: milestone == Milestone::Day60,
                day_30: milestone == Milestone::Day30,
            },
            ..with_stakeholders()
        }
    }

    #[test]
    fn forty_five_days_with_only_sixty_enabled_sends_exactly_once() {
        let sink = InMemorySink::new();
        let vendors = vec![vendor("Stripe", 45)];

        let first = evaluate_cadence(&vendors, &only(Milestone::Day60), &sink, now()).unwrap();
        assert_eq!(first.dispatched_events.len(), 1);
        let event = &first.dispatched_events[0];
        assert_eq!(event.milestone, Milestone::Day60);
        assert_eq!(event.channel, Channel::VendorDocRequest);
        assert_eq!(event.recipient_email, "stripe@vendors.ironframe.local");
        assert_eq!(first.vendors[0].current_cadence, CadenceBucket::Sixty);
        assert_eq!(first.vendors[0].last_request_sent, Some(now()));

        let second =
            evaluate_cadence(&first.vendors, &only(Milestone::Day60), &sink, now()).unwrap();
        assert!(second.dispatched_events.is_empty());
        assert_eq!(sink.outbound().len(), 1);
    }

    #[test]
    fn sixty_day_message_carries_template_and_read_receipt() {
        let sink = InMemorySink::new();
        evaluate_cadence(&[vendor("Stripe", 45)], &CadenceConfig::default(), &sink, now()).unwrap();
        let message = &sink.outbound()[0];
        assert_eq!(message.subject, "Document Update Request // Stripe");
        assert!(message.body.starts_with("NIST 800-53 Evidence Request"));
        assert!(message.require_read_receipt);
        assert_eq!(message.priority, Priority::Normal);
    }

    #[test]
    fn ninety_day_reminder_goes_to_vendor_contact() {
        let sink = InMemorySink::new();
        let result =
            evaluate_cadence(&[vendor("Palo Alto Networks", 75)], &CadenceConfig::default(), &sink, now())
                .unwrap();
        assert_eq!(result.dispatched_events.len(), 1);
        let message = &sink.outbound()[0];
        assert_eq!(message.channel, Channel::Cadence90Vendor);
        assert_eq!(message.priority, Priority::Low);
        assert_eq!(message.recipient_email, "palo-alto-networks@vendors.ironframe.local");
        assert_eq!(message.recipient_title, "Vendor Compliance Contact");
        assert!(message.body.contains("expires in 75 days"));
    }

    #[test]
    fn beyond_ninety_days_sends_nothing() {
        let sink = InMemorySink::new();
        let result =
            evaluate_cadence(&[vendor("GCP Cloud", 110)], &CadenceConfig::default(), &sink, now())
                .unwrap();
        assert!(result.dispatched_events.is_empty());
        assert_eq!(result.vendors[0].current_cadence, CadenceBucket::Ninety);
    }

    #[test]
    fn thirty_day_escalation_reaches_ciso_and_counsel() {
        let sink = InMemorySink::new();
        let result =
            evaluate_cadence(&[vendor("SWIFT", 20)], &with_stakeholders(), &sink, now()).unwrap();
        let recipients: Vec<_> = result
            .dispatched_events
            .iter()
            .map(|e| e.recipient_email.as_str())
            .collect();
        assert_eq!(recipients, vec!["ciso@ironframe.local", "legal@ironframe.local"]);
        assert!(result.skipped.is_empty());
        assert!(sink
            .outbound()
            .iter()
            .all(|m| m.priority == Priority::High && m.channel == Channel::Cadence30Stakeholder));

        let again =
            evaluate_cadence(&result.vendors, &with_stakeholders(), &sink, now()).unwrap();
        assert!(again.dispatched_events.is_empty());
    }

    #[test]
    fn thirty_days_without_stakeholders_is_skipped_not_failed() {
        let sink = InMemorySink::new();
        let vendors = vec![vendor("Crowdstrike", 20)];
        let result = evaluate_cadence(&vendors, &CadenceConfig::default(), &sink, now()).unwrap();

        assert!(result.dispatched_events.is_empty());
        assert_eq!(result.vendors[0].current_cadence, CadenceBucket::Thirty);
        assert_eq!(result.skipped.len(), 2);
        assert!(result.skipped.iter().all(|s| s.milestone == Some(Milestone::Day30)));
        assert!(!sink.has_dispatch_record("Crowdstrike", Milestone::Day30).unwrap());

        // Configuring stakeholders later still fires the escalation.
        let later = evaluate_cadence(&result.vendors, &with_stakeholders(), &sink, now()).unwrap();
        assert_eq!(later.dispatched_events.len(), 2);
    }

    #[test]
    fn missing_counsel_still_notifies_ciso() {
        let config = CadenceConfig {
            company_stakeholders: vec![
                stakeholder("ciso", "Chief Information Security Officer (CISO)", "ciso@ironframe.local"),
                stakeholder("gc", "General Counsel", ""),
            ],
            ..CadenceConfig::default()
        };
        let sink = InMemorySink::new();
        let result = evaluate_cadence(&[vendor("Twilio", 10)], &config, &sink, now()).unwrap();
        assert_eq!(result.dispatched_events.len(), 1);
        assert_eq!(result.dispatched_events[0].recipient_email, "ciso@ironframe.local");
        assert_eq!(
            result.skipped[0].reason,
            SkipReason::NoEscalationStakeholder {
                role: EscalationRole::LegalCounsel
            }
        );
    }

    #[test]
    fn unparseable_date_skips_only_that_vendor() {
        let sink = InMemorySink::new();
        let mut broken = vendor("ServiceNow", 0);
        broken.document_expiration_date = "TBD".into();
        broken.current_cadence = CadenceBucket::Sixty;
        let vendors = vec![broken, vendor("Stripe", 45)];

        let result = evaluate_cadence(&vendors, &CadenceConfig::default(), &sink, now()).unwrap();
        assert_eq!(result.vendors.len(), 2);
        assert_eq!(result.vendors[0].current_cadence, CadenceBucket::Sixty);
        assert_eq!(
            result.skipped,
            vec![CadenceSkip {
                vendor_name: "ServiceNow".into(),
                milestone: None,
                reason: SkipReason::UnparseableExpiration { value: "TBD".into() },
            }]
        );
        assert_eq!(result.dispatched_events.len(), 1);
        assert_eq!(result.dispatched_events[0].vendor_name, "Stripe");
    }

    #[test]
    fn overdue_vendor_is_bucketed_but_not_messaged() {
        let sink = InMemorySink::new();
        let result =
            evaluate_cadence(&[vendor("Schneider Electric", -3)], &with_stakeholders(), &sink, now())
                .unwrap();
        assert!(result.dispatched_events.is_empty());
        assert_eq!(result.vendors[0].current_cadence, CadenceBucket::Overdue);
    }

    #[test]
    fn disabled_milestones_still_refresh_bucket() {
        let config = CadenceConfig {
            cadence_alerts: CadenceAlertToggles {
                day_90: false,
                day_60: false,
                day_30: false,
            },
            ..with_stakeholders()
        };
        let sink = InMemorySink::new();
        let result = evaluate_cadence(&[vendor("Stripe", 45)], &config, &sink, now()).unwrap();
        assert!(result.dispatched_events.is_empty());
        assert_eq!(result.vendors[0].current_cadence, CadenceBucket::Sixty);
        assert_eq!(result.vendors[0].last_request_sent, None);
    }

    #[test]
    fn each_milestone_fires_once_as_expiration_approaches() {
        let sink = InMemorySink::new();
        let config = with_stakeholders();
        let mut vendors = vec![vendor("Azure Health", 80)];
        let mut milestones = Vec::new();
        for offset in 0..90 {
            let at = now() + Duration::days(offset);
            let result = evaluate_cadence(&vendors, &config, &sink, at).unwrap();
            milestones.extend(result.dispatched_events.iter().map(|e| e.milestone));
            vendors = result.vendors;
        }
        assert_eq!(
            milestones,
            vec![Milestone::Day90, Milestone::Day60, Milestone::Day30, Milestone::Day30]
        );
    }

    #[test]
    fn every_dispatch_is_audited() {
        let sink = InMemorySink::new();
        let vendors = vec![vendor("SWIFT", 20), vendor("Stripe", 45), vendor("Twilio", 75)];
        let result = evaluate_cadence(&vendors, &with_stakeholders(), &sink, now()).unwrap();
        let audit = sink.audit_entries();
        assert_eq!(audit.len(), result.dispatched_events.len());
        assert_eq!(audit.len(), 4);
        assert!(audit.iter().all(|e| e.action_type == AuditActionType::EmailSent));
        assert_eq!(
            audit[0].description,
            "High Priority // 30-Day Vendor Lapse Alert // SWIFT -> CISO (ciso@ironframe.local) [CADENCE_30_STAKEHOLDER]"
        );
        assert!(sink.verify_audit_chain().chain_valid);
    }

    #[test]
    fn sub_day_remainder_counts_as_a_full_day() {
        let sink = InMemorySink::new();
        // 30 minutes out rounds up to one day.
        let mut soon = vendor("Stripe", 0);
        soon.document_expiration_date = (now() + Duration::minutes(30)).to_rfc3339();
        evaluate_cadence(&[soon], &with_stakeholders(), &sink, now()).unwrap();
        assert!(sink.outbound()[0].body.contains("expires in 1 days"));
    }

    struct UnavailableSink;

    impl NotificationSink for UnavailableSink {
        fn has_dispatch_record(&self, _: &str, _: Milestone) -> Result<bool, SinkError> {
            Err(SinkError::Unavailable("connection refused".into()))
        }

        fn claim_milestone(&self, _: &str, _: Milestone) -> Result<bool, SinkError> {
            unreachable!()
        }

        fn release_milestone(&self, _: &str, _: Milestone) -> Result<(), SinkError> {
            unreachable!()
        }

        fn record_dispatch(&self, _: DispatchRequest) -> Result<OutboundMessageRecord, SinkError> {
            unreachable!()
        }

        fn append_audit_entry(
            &self,
            _: AuditActionType,
            _: Option<&str>,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<AuditEntry, SinkError> {
            unreachable!()
        }
    }

    /// Claims succeed but every message write fails.
    struct FullDiskSink {
        inner: InMemorySink,
    }

    impl NotificationSink for FullDiskSink {
        fn has_dispatch_record(&self, vendor: &str, milestone: Milestone) -> Result<bool, SinkError> {
            self.inner.has_dispatch_record(vendor, milestone)
        }

        fn claim_milestone(&self, vendor: &str, milestone: Milestone) -> Result<bool, SinkError> {
            self.inner.claim_milestone(vendor, milestone)
        }

        fn release_milestone(&self, vendor: &str, milestone: Milestone) -> Result<(), SinkError> {
            self.inner.release_milestone(vendor, milestone)
        }

        fn record_dispatch(&self, _: DispatchRequest) -> Result<OutboundMessageRecord, SinkError> {
            Err(SinkError::Unavailable("no space left on device".into()))
        }

        fn append_audit_entry(
            &self,
            _: AuditActionType,
            _: Option<&str>,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<AuditEntry, SinkError> {
            unreachable!()
        }
    }

    #[test]
    fn failed_record_releases_the_claim() {
        let inner = InMemorySink::new();
        let sink = FullDiskSink {
            inner: inner.clone(),
        };
        let vendors = vec![vendor("Stripe", 45)];

        let err = evaluate_cadence(&vendors, &CadenceConfig::default(), &sink, now()).unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
        assert!(!inner.has_dispatch_record("Stripe", Milestone::Day60).unwrap());

        let retry = evaluate_cadence(&vendors, &CadenceConfig::default(), &inner, now()).unwrap();
        assert_eq!(retry.dispatched_events.len(), 1);
        assert_eq!(retry.dispatched_events[0].milestone, Milestone::Day60);
    }

    #[test]
    fn plan_dispatches_nothing_and_claims_nothing() {
        let sink = InMemorySink::new();
        let plan = plan_cadence(&[vendor("Stripe", 45)], &CadenceConfig::default(), &sink, now())
            .unwrap();
        assert_eq!(plan.due.len(), 1);
        assert_eq!(plan.due[0].requests[0].associated_entity, "VAULTBANK");
        assert!(sink.outbound().is_empty());
        assert!(!sink.has_dispatch_record("Stripe", Milestone::Day60).unwrap());
    }

    #[test]
    fn claimed_milestone_dispatches_nothing() {
        let sink = InMemorySink::new();
        let mut plan =
            plan_cadence(&[vendor("Stripe", 45)], &CadenceConfig::default(), &sink, now()).unwrap();
        sink.claim_milestone("Stripe", Milestone::Day60).unwrap();
        let events = dispatch_milestone(plan.due.remove(0), &sink).unwrap();
        assert!(events.is_empty());
        assert!(sink.outbound().is_empty());
    }

    #[test]
    fn dispatch_audit_names_the_vendor_entity() {
        let sink = InMemorySink::new();
        evaluate_cadence(&[vendor("Stripe", 45)], &CadenceConfig::default(), &sink, now()).unwrap();
        assert_eq!(sink.outbound()[0].associated_entity.as_deref(), Some("VAULTBANK"));
        assert_eq!(
            sink.audit_entries()[0].associated_entity.as_deref(),
            Some("VAULTBANK")
        );
    }

    #[test]
    fn sink_failure_aborts_the_run() {
        let err = evaluate_cadence(&[vendor("Stripe", 45)], &CadenceConfig::default(), &UnavailableSink, now())
            .unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::CadenceAlertToggles;
    use crate::memory::InMemorySink;
    use crate::vendor::{Industry, RiskTier};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    proptest! {
        /// A second run at the same instant never dispatches, and a single
        /// run never fires more than one milestone per vendor.
        #[test]
        fn evaluation_is_idempotent(
            days in -20i64..120,
            day_90 in any::<bool>(),
            day_60 in any::<bool>(),
            day_30 in any::<bool>(),
        ) {
            let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
            let vendor = VendorRecord {
                vendor_name: "Proptest Vendor".into(),
                associated_entity: "GRIDCORE".into(),
                industry: Industry::Energy,
                risk_tier: RiskTier::Low,
                document_expiration_date: (now + Duration::days(days)).to_rfc3339(),
                last_request_sent: None,
                current_cadence: CadenceBucket::Ninety,
                compliance_contact_email: None,
            };
            let config = CadenceConfig {
                cadence_alerts: CadenceAlertToggles { day_90, day_60, day_30 },
                company_stakeholders: vec![crate::CompanyStakeholder {
                    id: "ciso".into(),
                    name: "Dana".into(),
                    title: "CISO".into(),
                    email: "ciso@ironframe.local".into(),
                    department: "Security".into(),
                    role: None,
                }],
                ..CadenceConfig::default()
            };
            let sink = InMemorySink::new();

            let first = evaluate_cadence(&[vendor], &config, &sink, now).unwrap();
            let fired: std::collections::HashSet<_> =
                first.dispatched_events.iter().map(|e| e.milestone).collect();
            prop_assert!(fired.len() <= 1);
            prop_assert_eq!(first.vendors[0].current_cadence, CadenceBucket::from_days(days));

            let second = evaluate_cadence(&first.vendors, &config, &sink, now).unwrap();
            prop_assert!(second.dispatched_events.is_empty());
        }
    }
}
