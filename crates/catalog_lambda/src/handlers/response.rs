use std::collections::BTreeMap;

use catalog_core::envelope::{ErrorCode, ErrorEnvelope, SuccessEnvelope, RESPONSE_HEADERS};
use catalog_core::product::iso_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proxy-integration response shape understood by API Gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

pub fn api_headers() -> BTreeMap<String, String> {
    RESPONSE_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub fn success_response(
    data: impl Serialize,
    message: &str,
    now: DateTime<Utc>,
) -> Result<ApiGatewayResponse, serde_json::Error> {
    let envelope = SuccessEnvelope::new(data, message, iso_timestamp(now));
    Ok(ApiGatewayResponse {
        status_code: 200,
        headers: api_headers(),
        body: serde_json::to_string(&envelope)?,
    })
}

pub fn error_response(code: ErrorCode, message: &str, now: DateTime<Utc>) -> ApiGatewayResponse {
    let envelope = ErrorEnvelope::new(code, message, iso_timestamp(now));
    ApiGatewayResponse {
        status_code: code.status_code(),
        headers: api_headers(),
        body: serde_json::json!(envelope).to_string(),
    }
}
