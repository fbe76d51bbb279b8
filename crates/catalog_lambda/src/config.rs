use std::time::Duration;

use thiserror::Error;

use crate::adapters::callback::DEFAULT_CALLBACK_TIMEOUT;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const INIT_FUNCTION_NAME_VAR: &str = "INIT_FUNCTION_NAME";
pub const DYNAMODB_ENDPOINT_URL_VAR: &str = "DYNAMODB_ENDPOINT_URL";
pub const CALLBACK_TIMEOUT_SECS_VAR: &str = "CALLBACK_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("INIT_FUNCTION_NAME or TABLE_NAME must be configured")]
    NoSeedingTarget,
}

/// Settings for functions that talk to the catalog table directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub table_name: String,
    pub dynamodb_endpoint_url: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: non_blank(&lookup, TABLE_NAME_VAR)
                .ok_or(ConfigError::Missing(TABLE_NAME_VAR))?,
            dynamodb_endpoint_url: non_blank(&lookup, DYNAMODB_ENDPOINT_URL_VAR),
        })
    }
}

/// Settings for the lifecycle provider. Seeding goes through
/// `INIT_FUNCTION_NAME` when set, otherwise straight to `TABLE_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub init_function_name: Option<String>,
    pub table_name: Option<String>,
    pub dynamodb_endpoint_url: Option<String>,
    pub callback_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            init_function_name: None,
            table_name: None,
            dynamodb_endpoint_url: None,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let callback_timeout = match non_blank(&lookup, CALLBACK_TIMEOUT_SECS_VAR) {
            None => DEFAULT_CALLBACK_TIMEOUT,
            Some(value) => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: CALLBACK_TIMEOUT_SECS_VAR,
                        value,
                    })
                }
            },
        };

        Ok(Self {
            init_function_name: non_blank(&lookup, INIT_FUNCTION_NAME_VAR),
            table_name: non_blank(&lookup, TABLE_NAME_VAR),
            dynamodb_endpoint_url: non_blank(&lookup, DYNAMODB_ENDPOINT_URL_VAR),
            callback_timeout,
        })
    }
}

fn non_blank(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
