use catalog_core::lifecycle::ReportStatus;
use catalog_lambda::adapters::callback::HttpCallbackTransport;
use catalog_lambda::adapters::dynamodb::DynamoDbCatalogStore;
use catalog_lambda::adapters::seed_invoker::LambdaSeedInvoker;
use catalog_lambda::config::{ConfigError, ProviderConfig};
use catalog_lambda::handlers::provider::{handle_lifecycle_payload, Delivery};
use catalog_lambda::handlers::seed::{Seeder, StoreSeeder, UnconfiguredSeeder};
use catalog_lambda::logging::init_tracing;
use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderResponse {
    status: ReportStatus,
    reason: String,
    callback_delivered: bool,
}

async fn handle_request(event: LambdaEvent<serde_json::Value>) -> Result<ProviderResponse, Error> {
    // A broken configuration still has to reach the orchestrator as FAILED.
    let (config, config_problem) = match ProviderConfig::from_env() {
        Ok(config) => (config, None),
        Err(config_error) => (ProviderConfig::default(), Some(config_error.to_string())),
    };

    let transport = HttpCallbackTransport::with_timeout_or_default(config.callback_timeout);
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let store = match (&config.init_function_name, &config.table_name) {
        (None, Some(table_name)) => Some(DynamoDbCatalogStore::new(
            &aws_config,
            table_name.clone(),
            config.dynamodb_endpoint_url.as_deref(),
        )),
        _ => None,
    };

    let seeder: Box<dyn Seeder + '_> = match (config_problem, &config.init_function_name, &store) {
        (Some(problem), _, _) => Box::new(UnconfiguredSeeder::new(problem)),
        (None, Some(function_name), _) => {
            Box::new(LambdaSeedInvoker::new(&aws_config, function_name.clone()))
        }
        (None, None, Some(store)) => Box::new(StoreSeeder::new(store, Utc::now())),
        (None, None, None) => {
            let reason = ConfigError::NoSeedingTarget.to_string();
            Box::new(UnconfiguredSeeder::new(reason))
        }
    };

    let result = handle_lifecycle_payload(&event.payload, seeder.as_ref(), &transport)?;

    Ok(ProviderResponse {
        status: result.status(),
        reason: result.outcome.reason.clone(),
        callback_delivered: matches!(result.delivery, Delivery::Acknowledged(_)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
