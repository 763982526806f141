//! # Recurring Cadence Evaluation
//!
//! [`run_evaluation`] runs one cadence pass over the vendor registry and
//! writes the results through to storage. Both the HTTP trigger and the
//! background job spawned by [`spawn_cadence_job`] go through it, and the
//! state's evaluation lock keeps passes within this process from
//! interleaving.

use std::time::Duration;

use chrono::{DateTime, Utc};
use ironframe_cadence::{
    dispatch_milestone, plan_cadence, CadenceDispatchEvent, CadenceEvaluation, NotificationSink,
    PlannedMilestone, VendorRecord,
};
use ironframe_core::TenantKey;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::AppError;
use crate::state::AppState;

/// Evaluate registered vendors at `now`, all of them or only `scope`'s.
///
/// Each due milestone is claimed durably before it is dispatched; a
/// milestone another instance already claimed is skipped. Refreshed cadence
/// buckets and `last_request_sent` stamps are written back to the registry.
/// Queued sink changes are flushed to the database even when the
/// evaluation itself fails part-way.
pub async fn run_evaluation(
    state: &AppState,
    now: DateTime<Utc>,
    scope: Option<TenantKey>,
) -> Result<CadenceEvaluation, AppError> {
    let _guard = state.evaluation_lock.lock().await;

    let vendors: Vec<VendorRecord> = state
        .vendors
        .list()
        .into_iter()
        .filter(|v| scope.map_or(true, |tenant| v.tenant() == Some(tenant)))
        .collect();
    let mut plan = plan_cadence(&vendors, &state.cadence, &state.sink, now)?;
    let due = std::mem::take(&mut plan.due);

    let dispatched = dispatch_due(state, due).await;
    let persisted = state.persist_changes().await;
    let evaluation = plan.into_evaluation(dispatched?);
    persisted?;

    for vendor in &evaluation.vendors {
        state
            .vendors
            .insert(vendor.vendor_name.clone(), vendor.clone());
        state.persist_vendor(vendor).await?;
    }

    tracing::info!(
        tenant = scope.map(|t| t.slug()).unwrap_or("all"),
        vendors = evaluation.vendors.len(),
        dispatched = evaluation.dispatched_events.len(),
        skipped = evaluation.skipped.len(),
        "cadence evaluation finished"
    );
    Ok(evaluation)
}

async fn dispatch_due(
    state: &AppState,
    due: Vec<PlannedMilestone>,
) -> Result<Vec<CadenceDispatchEvent>, AppError> {
    let mut events = Vec::new();
    for planned in due {
        let vendor_name = planned.vendor_name.clone();
        let milestone = planned.milestone;
        if !state.claim_milestone(&vendor_name, milestone).await? {
            tracing::warn!(
                vendor = %vendor_name,
                milestone = %milestone,
                "milestone already claimed by another instance; not dispatching"
            );
            continue;
        }
        match dispatch_milestone(planned, &state.sink) {
            Ok(dispatched) => events.extend(dispatched),
            Err(e) => {
                if matches!(state.sink.has_dispatch_record(&vendor_name, milestone), Ok(false)) {
                    state.release_milestone(&vendor_name, milestone).await?;
                }
                return Err(e.into());
            }
        }
    }
    Ok(events)
}

/// Start the recurring evaluation job.
///
/// Returns `None` when `cadence_interval_secs` is `0`. The first pass runs
/// immediately; a failed pass is logged and the job keeps its schedule.
pub fn spawn_cadence_job(state: AppState) -> Option<tokio::task::JoinHandle<()>> {
    let secs = state.config.cadence_interval_secs;
    if secs == 0 {
        tracing::info!("recurring cadence evaluation disabled");
        return None;
    }
    tracing::info!(interval_secs = secs, "starting recurring cadence evaluation");

    Some(tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = run_evaluation(&state, Utc::now(), None).await {
                tracing::warn!(error = %e, "scheduled cadence evaluation failed");
            }
        }
    }))
}
