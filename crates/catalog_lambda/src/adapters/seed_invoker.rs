use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::types::InvocationType;
use serde_json::Value;
use tracing::info;

use super::block_on;
use crate::handlers::response::ApiGatewayResponse;
use crate::handlers::seed::{SeedError, SeedResponseBody, SeedSummary, Seeder};

/// Runs the seeder function synchronously (`RequestResponse`) and reads its
/// verdict from the response payload.
#[derive(Debug, Clone)]
pub struct LambdaSeedInvoker {
    client: aws_sdk_lambda::Client,
    function_name: String,
}

impl LambdaSeedInvoker {
    pub fn new(sdk_config: &aws_config::SdkConfig, function_name: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_lambda::Client::new(sdk_config),
            function_name: function_name.into(),
        }
    }
}

impl Seeder for LambdaSeedInvoker {
    fn seed(&self) -> Result<SeedSummary, SeedError> {
        let request = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::RequestResponse);

        let output = block_on(request.send()).map_err(|error| {
            SeedError::Invocation(format!(
                "{}: {}",
                self.function_name,
                DisplayErrorContext(&error)
            ))
        })?;

        info!(
            component = "seed_invoker",
            function_name = %self.function_name,
            status_code = output.status_code(),
            function_error = output.function_error().unwrap_or(""),
            "seeder function returned"
        );

        let payload = output
            .payload()
            .map(|blob| blob.as_ref())
            .unwrap_or_default();
        interpret_seed_invocation(output.function_error(), payload)
    }
}

/// A completed invocation only counts as seeded when the function did not
/// error and its response says `statusCode: 200` with `success: true`.
pub fn interpret_seed_invocation(
    function_error: Option<&str>,
    payload: &[u8],
) -> Result<SeedSummary, SeedError> {
    if let Some(kind) = function_error {
        let message = serde_json::from_slice::<Value>(payload)
            .ok()
            .and_then(|value| {
                value
                    .get("errorMessage")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| kind.to_string());
        return Err(SeedError::Rejected(message));
    }

    let response: ApiGatewayResponse = serde_json::from_slice(payload)
        .map_err(|error| SeedError::Rejected(format!("unreadable seeder response: {error}")))?;
    let body: SeedResponseBody = serde_json::from_str(&response.body)
        .map_err(|error| SeedError::Rejected(format!("unreadable seeder body: {error}")))?;

    if response.status_code != 200 || !body.success {
        return Err(SeedError::Rejected(body.error.unwrap_or_else(|| {
            format!("seeder responded with status {}", response.status_code)
        })));
    }

    Ok(SeedSummary {
        count: body.count.unwrap_or_default(),
        version: body.version.unwrap_or_default(),
        fingerprint: body.fingerprint.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(status_code: u16, body: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({"statusCode": status_code, "body": body.to_string()}))
            .expect("payload should serialize")
    }

    #[test]
    fn successful_response_yields_summary() {
        let bytes = payload(
            200,
            json!({
                "success": true,
                "message": "Sample data initialized successfully",
                "count": 5,
                "version": "v1",
                "fingerprint": "abc"
            }),
        );

        let summary = interpret_seed_invocation(None, &bytes).expect("should be a success");
        assert_eq!(summary.count, 5);
        assert_eq!(summary.version, "v1");
    }

    #[test]
    fn failed_seed_response_is_rejected_with_its_message() {
        let bytes = payload(
            500,
            json!({"success": false, "error": "Requested resource not found"}),
        );

        let error = interpret_seed_invocation(None, &bytes).expect_err("should fail");
        assert!(error.to_string().contains("Requested resource not found"));
    }

    #[test]
    fn function_error_uses_error_message_from_payload() {
        let bytes = serde_json::to_vec(&json!({
            "errorType": "Runtime.ExitError",
            "errorMessage": "RequestId: abc Error: Runtime exited"
        }))
        .expect("payload should serialize");

        let error = interpret_seed_invocation(Some("Unhandled"), &bytes).expect_err("should fail");
        assert!(error.to_string().contains("Runtime exited"));

        let error = interpret_seed_invocation(Some("Unhandled"), b"").expect_err("should fail");
        assert!(error.to_string().contains("Unhandled"));
    }

    #[test]
    fn unreadable_payload_is_rejected() {
        assert!(interpret_seed_invocation(None, b"null").is_err());
    }
}
