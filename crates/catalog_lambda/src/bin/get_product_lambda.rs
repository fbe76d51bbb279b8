use catalog_core::envelope::{ErrorCode, GET_FAILURE_MESSAGE};
use catalog_lambda::adapters::dynamodb::DynamoDbCatalogStore;
use catalog_lambda::config::StoreConfig;
use catalog_lambda::handlers::products::handle_get_product;
use catalog_lambda::handlers::response::{error_response, ApiGatewayResponse};
use catalog_lambda::logging::init_tracing;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};

async fn handle_request(
    event: LambdaEvent<serde_json::Value>,
) -> Result<ApiGatewayResponse, Error> {
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(config_error) => {
            tracing::error!(error = %config_error, "get function is not configured");
            return Ok(error_response(
                ErrorCode::InternalError,
                GET_FAILURE_MESSAGE,
                Utc::now(),
            ));
        }
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoDbCatalogStore::new(
        &aws_config,
        config.table_name,
        config.dynamodb_endpoint_url.as_deref(),
    );

    Ok(handle_get_product(&event.payload, &store, Utc::now()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
