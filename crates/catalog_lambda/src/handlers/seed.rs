use std::time::Instant;

use catalog_core::product::iso_timestamp;
use catalog_core::seed_data::{seed_fingerprint, seed_products, SEED_DATA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::adapters::catalog_store::{CatalogStore, StoreError};
use crate::handlers::response::ApiGatewayResponse;

const COMPONENT: &str = "seeder";

pub const SEED_SUCCESS_MESSAGE: &str = "Sample data initialized successfully";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to write seed data: {0}")]
    Store(#[from] StoreError),
    #[error("failed to invoke seeder function: {0}")]
    Invocation(String),
    #[error("seeder function reported failure: {0}")]
    Rejected(String),
    #[error("no seeding target configured: {0}")]
    Unconfigured(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedSummary {
    pub count: usize,
    pub version: String,
    pub fingerprint: String,
}

/// Body of the seeder function's response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedResponseBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Loads the seed data set somewhere. Called synchronously by the
/// reconciliation controller; must be safe to run repeatedly.
pub trait Seeder {
    fn seed(&self) -> Result<SeedSummary, SeedError>;
}

/// Seeds a store directly from this process.
pub struct StoreSeeder<'a, S: CatalogStore> {
    store: &'a S,
    seeded_at: DateTime<Utc>,
}

impl<'a, S: CatalogStore> StoreSeeder<'a, S> {
    pub fn new(store: &'a S, seeded_at: DateTime<Utc>) -> Self {
        Self { store, seeded_at }
    }
}

impl<S: CatalogStore> Seeder for StoreSeeder<'_, S> {
    fn seed(&self) -> Result<SeedSummary, SeedError> {
        seed_catalog(self.store, self.seeded_at)
    }
}

/// Stands in when neither a seeder function nor a table is configured, so the
/// lifecycle event still ends in a `FAILED` report.
#[derive(Debug, Clone)]
pub struct UnconfiguredSeeder {
    reason: String,
}

impl UnconfiguredSeeder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Seeder for UnconfiguredSeeder {
    fn seed(&self) -> Result<SeedSummary, SeedError> {
        Err(SeedError::Unconfigured(self.reason.clone()))
    }
}

/// Writes the seed set as one batch. Records sharing a `productId` overwrite
/// what is there. Not transactional: on failure a subset may already be
/// written, and rerunning converges.
pub fn seed_catalog(
    store: &impl CatalogStore,
    seeded_at: DateTime<Utc>,
) -> Result<SeedSummary, SeedError> {
    let started_at = Instant::now();
    let products = seed_products(&iso_timestamp(seeded_at));
    info!(
        component = COMPONENT,
        event = "seed_started",
        records = products.len(),
        version = SEED_DATA_VERSION,
        "writing seed data"
    );

    store.batch_put(&products)?;

    let summary = SeedSummary {
        count: products.len(),
        version: SEED_DATA_VERSION.to_string(),
        fingerprint: seed_fingerprint(),
    };
    info!(
        component = COMPONENT,
        event = "seed_completed",
        records = summary.count,
        fingerprint = %summary.fingerprint,
        duration_ms = started_at.elapsed().as_millis() as u64,
        "seed data written"
    );
    Ok(summary)
}

/// Entry point of the standalone seeder function.
pub fn handle_seed_request(store: &impl CatalogStore, now: DateTime<Utc>) -> ApiGatewayResponse {
    let (status_code, body) = match seed_catalog(store, now) {
        Ok(summary) => (
            200,
            SeedResponseBody {
                success: true,
                message: Some(SEED_SUCCESS_MESSAGE.to_string()),
                count: Some(summary.count),
                version: Some(summary.version),
                fingerprint: Some(summary.fingerprint),
                error: None,
            },
        ),
        Err(seed_error) => {
            error!(
                component = COMPONENT,
                event = "seed_failed",
                error = %seed_error,
                "failed to initialize sample data"
            );
            (
                500,
                SeedResponseBody {
                    success: false,
                    message: None,
                    count: None,
                    version: None,
                    fingerprint: None,
                    error: Some(seed_error.to_string()),
                },
            )
        }
    };

    ApiGatewayResponse {
        status_code,
        headers: Default::default(),
        body: serde_json::json!(body).to_string(),
    }
}
