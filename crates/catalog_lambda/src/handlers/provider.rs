//! Reconciliation controller for the deployment lifecycle.
//!
//! Each invocation handles one event in isolation:
//! `Idle -> Handling(Create|Update|Delete) -> Reported(Success|Failed)`.
//! The outcome is computed by an exhaustive match and then handed to
//! [`report`] exactly once, so no branch can finish without a callback.

use std::time::Instant;

use catalog_core::lifecycle::{
    CallbackAddress, CallbackReport, LifecycleEvent, ReconcileOutcome, ReportStatus, RequestType,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::adapters::callback::{CallbackError, CallbackTarget, CallbackTransport};
use crate::handlers::seed::Seeder;

const COMPONENT: &str = "init_provider";

pub const SEED_SUCCESS_REASON: &str = "Data initialized successfully";
pub const DELETE_SUCCESS_REASON: &str = "Delete operation completed";

/// A payload that is neither a lifecycle event nor carries a `ResponseURL`,
/// so there is nobody to report to.
#[derive(Debug, Error)]
#[error("lifecycle event cannot be answered: {0}")]
pub struct UnanswerableEvent(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The orchestrator endpoint answered with this HTTP status.
    Acknowledged(u16),
    /// The single attempt did not reach the orchestrator.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub outcome: ReconcileOutcome,
    pub delivery: Delivery,
}

impl ReconcileResult {
    pub fn status(&self) -> ReportStatus {
        self.outcome.status
    }
}

/// Entry point for a raw invocation payload. A payload that does not parse as
/// an event is still answered with `FAILED` whenever its `ResponseURL` is
/// readable; the seeder is not called in that case.
pub fn handle_lifecycle_payload(
    payload: &Value,
    seeder: &dyn Seeder,
    transport: &dyn CallbackTransport,
) -> Result<ReconcileResult, UnanswerableEvent> {
    let parse_error = match LifecycleEvent::deserialize(payload) {
        Ok(event) => return Ok(handle_lifecycle_event(&event, seeder, transport)),
        Err(parse_error) => parse_error,
    };

    let Some(address) = CallbackAddress::from_payload(payload) else {
        error!(
            component = COMPONENT,
            event = "lifecycle_unanswerable",
            error = %parse_error,
            "lifecycle payload has no callback address"
        );
        return Err(UnanswerableEvent(parse_error.to_string()));
    };

    error!(
        component = COMPONENT,
        event = "lifecycle_invalid",
        request_id = %address.request_id,
        error = %parse_error,
        "invalid lifecycle event; reporting FAILED"
    );
    let outcome = ReconcileOutcome::failed(format!("invalid lifecycle event: {parse_error}"));
    let delivery = report_to(&address, &outcome, transport);
    Ok(ReconcileResult { outcome, delivery })
}

pub fn handle_lifecycle_event(
    event: &LifecycleEvent,
    seeder: &dyn Seeder,
    transport: &dyn CallbackTransport,
) -> ReconcileResult {
    let started_at = Instant::now();
    info!(
        component = COMPONENT,
        event = "lifecycle_received",
        request_type = ?event.request_type,
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
        stack_id = %event.stack_id,
        "handling lifecycle event"
    );

    let outcome = reconcile(event, seeder);
    let delivery = report(event, &outcome, transport);

    info!(
        component = COMPONENT,
        event = "lifecycle_completed",
        request_id = %event.request_id,
        status = ?outcome.status,
        delivered = matches!(delivery, Delivery::Acknowledged(_)),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "lifecycle event handled"
    );

    ReconcileResult { outcome, delivery }
}

/// Decides the outcome of an event without reporting it.
pub fn reconcile(event: &LifecycleEvent, seeder: &dyn Seeder) -> ReconcileOutcome {
    match event.request_type {
        RequestType::Create | RequestType::Update => match seeder.seed() {
            Ok(summary) => ReconcileOutcome::success(SEED_SUCCESS_REASON)
                .with_data("SeededCount", summary.count.to_string())
                .with_data("SeedVersion", summary.version)
                .with_data("SeedFingerprint", summary.fingerprint),
            Err(seed_error) => {
                error!(
                    component = COMPONENT,
                    event = "seed_failed",
                    request_id = %event.request_id,
                    error = %seed_error,
                    "seeding failed; reporting FAILED"
                );
                ReconcileOutcome::failed(seed_error.to_string())
            }
        },
        // Sample data is left in place on delete; the table's own removal
        // policy owns teardown.
        RequestType::Delete => ReconcileOutcome::success(DELETE_SUCCESS_REASON),
    }
}

/// Sends the callback report for `event`. Exactly one delivery attempt; a
/// failure is logged and returned, never retried here.
pub fn report(
    event: &LifecycleEvent,
    outcome: &ReconcileOutcome,
    transport: &dyn CallbackTransport,
) -> Delivery {
    report_to(&event.callback_address(), outcome, transport)
}

fn report_to(
    address: &CallbackAddress,
    outcome: &ReconcileOutcome,
    transport: &dyn CallbackTransport,
) -> Delivery {
    let callback = CallbackReport::for_address(address, outcome);
    let attempt = serde_json::to_vec(&callback)
        .map_err(CallbackError::from)
        .and_then(|body| {
            let target = CallbackTarget::resolve(&address.response_url)?;
            transport.deliver(&target, &body)
        });

    match attempt {
        Ok(status_code) => {
            if (200..300).contains(&status_code) {
                info!(
                    component = COMPONENT,
                    event = "callback_delivered",
                    request_id = %address.request_id,
                    status = ?callback.status,
                    status_code,
                    "callback delivered"
                );
            } else {
                warn!(
                    component = COMPONENT,
                    event = "callback_rejected",
                    request_id = %address.request_id,
                    status = ?callback.status,
                    status_code,
                    "orchestrator answered the callback with a non-success status"
                );
            }
            Delivery::Acknowledged(status_code)
        }
        Err(callback_error) => {
            error!(
                component = COMPONENT,
                event = "callback_failed",
                request_id = %address.request_id,
                status = ?callback.status,
                error = %callback_error,
                "failed to send callback report"
            );
            Delivery::Failed(callback_error.to_string())
        }
    }
}
