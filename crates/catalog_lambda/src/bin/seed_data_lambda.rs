use catalog_lambda::adapters::dynamodb::DynamoDbCatalogStore;
use catalog_lambda::config::StoreConfig;
use catalog_lambda::handlers::response::ApiGatewayResponse;
use catalog_lambda::handlers::seed::{handle_seed_request, SeedResponseBody};
use catalog_lambda::logging::init_tracing;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};

async fn handle_request(
    _event: LambdaEvent<serde_json::Value>,
) -> Result<ApiGatewayResponse, Error> {
    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(config_error) => {
            tracing::error!(error = %config_error, "seeder function is not configured");
            let body = SeedResponseBody {
                success: false,
                message: None,
                count: None,
                version: None,
                fingerprint: None,
                error: Some(config_error.to_string()),
            };
            return Ok(ApiGatewayResponse {
                status_code: 500,
                headers: Default::default(),
                body: serde_json::to_string(&body)?,
            });
        }
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoDbCatalogStore::new(
        &aws_config,
        config.table_name,
        config.dynamodb_endpoint_url.as_deref(),
    );

    Ok(handle_seed_request(&store, Utc::now()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
