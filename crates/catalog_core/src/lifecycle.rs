//! Deployment lifecycle contract.
//!
//! The orchestrator (a CloudFormation custom resource) delivers one
//! [`LifecycleEvent`] per create/update/delete and blocks until exactly one
//! [`CallbackReport`] arrives at the event's `ResponseURL`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reasons longer than this are cut so the report stays well under the
/// orchestrator's response size limit.
pub const MAX_REASON_CHARS: usize = 1_024;

const FALLBACK_FAILURE_REASON: &str = "Reconciliation failed without an error message";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    pub request_id: String,
    pub logical_resource_id: String,
    pub stack_id: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Value>,
}

impl LifecycleEvent {
    /// The physical id echoed back to the orchestrator. Reusing the incoming id
    /// on update keeps the orchestrator from treating the resource as replaced.
    pub fn physical_resource_id(&self) -> &str {
        self.physical_resource_id
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.logical_resource_id)
    }

    pub fn callback_address(&self) -> CallbackAddress {
        CallbackAddress {
            response_url: self.response_url.clone(),
            request_id: self.request_id.clone(),
            stack_id: self.stack_id.clone(),
            logical_resource_id: self.logical_resource_id.clone(),
            physical_resource_id: self.physical_resource_id().to_string(),
        }
    }
}

/// Where a report goes and the identifiers it has to echo.
///
/// Built from a parsed [`LifecycleEvent`], or salvaged from a payload that did
/// not parse so that the orchestrator still gets an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackAddress {
    pub response_url: String,
    pub request_id: String,
    pub stack_id: String,
    pub logical_resource_id: String,
    pub physical_resource_id: String,
}

impl CallbackAddress {
    /// Reads the identifiers leniently. Returns `None` only when there is no
    /// non-empty `ResponseURL` to answer; other missing ids come back empty.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let response_url = field("ResponseURL")?;
        let physical_resource_id = field("PhysicalResourceId")
            .or_else(|| field("LogicalResourceId"))
            .or_else(|| field("RequestId"))
            .unwrap_or_default();

        Some(Self {
            response_url,
            request_id: field("RequestId").unwrap_or_default(),
            stack_id: field("StackId").unwrap_or_default(),
            logical_resource_id: field("LogicalResourceId").unwrap_or_default(),
            physical_resource_id,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Success,
    Failed,
}

/// Result of handling one lifecycle event, before it is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub status: ReportStatus,
    pub reason: String,
    pub data: BTreeMap<String, String>,
}

impl ReconcileOutcome {
    pub fn success(reason: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Success,
            reason: reason.into(),
            data: BTreeMap::new(),
        }
    }

    /// A failed outcome always carries a non-empty reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            FALLBACK_FAILURE_REASON.to_string()
        } else {
            reason
        };
        Self {
            status: ReportStatus::Failed,
            reason,
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackReport {
    pub status: ReportStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: BTreeMap<String, String>,
}

impl CallbackReport {
    pub fn for_event(event: &LifecycleEvent, outcome: &ReconcileOutcome) -> Self {
        Self::for_address(&event.callback_address(), outcome)
    }

    pub fn for_address(address: &CallbackAddress, outcome: &ReconcileOutcome) -> Self {
        let reason = truncate_chars(&outcome.reason, MAX_REASON_CHARS);
        let mut data = outcome.data.clone();
        data.insert("Message".to_string(), reason.clone());

        Self {
            status: outcome.status,
            reason,
            physical_resource_id: address.physical_resource_id.clone(),
            stack_id: address.stack_id.clone(),
            request_id: address.request_id.clone(),
            logical_resource_id: address.logical_resource_id.clone(),
            data,
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
