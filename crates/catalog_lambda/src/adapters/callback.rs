use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, warn};

use super::block_on;

pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("invalid callback address: {0}")]
    InvalidAddress(String),
    #[error("unsupported callback scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("failed to serialize callback report: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("callback delivery failed: {0}")]
    Transport(String),
}

/// A callback address resolved into the pieces the transport needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    url: Url,
    port: u16,
}

impl CallbackTarget {
    pub fn resolve(address: &str) -> Result<Self, CallbackError> {
        let url = Url::parse(address.trim())
            .map_err(|error| CallbackError::InvalidAddress(format!("{error}")))?;

        let default_port = match url.scheme() {
            "https" => 443,
            "http" => 80,
            other => return Err(CallbackError::UnsupportedScheme(other.to_string())),
        };
        if url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(CallbackError::InvalidAddress(
                "callback address has no host".to_string(),
            ));
        }

        let port = url.port().unwrap_or(default_port);
        Ok(Self { url, port })
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The path without the query, which carries the presigned signature and
    /// stays out of logs.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Outbound leg of the lifecycle protocol. One call is one delivery attempt;
/// the returned value is the orchestrator's HTTP status.
pub trait CallbackTransport {
    fn deliver(&self, target: &CallbackTarget, body: &[u8]) -> Result<u16, CallbackError>;
}

/// `PUT`s the report with an empty `Content-Type` and an explicit
/// `Content-Length`, which is what the orchestrator's presigned URL expects.
#[derive(Debug, Clone)]
pub struct HttpCallbackTransport {
    client: Client,
}

impl HttpCallbackTransport {
    pub fn new(timeout: Duration) -> Result<Self, CallbackError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                CallbackError::Transport(format!("failed to build client: {error}"))
            })?;
        Ok(Self { client })
    }

    /// Like [`HttpCallbackTransport::new`], but never gives up on reporting:
    /// when the configured client cannot be built a default one is used.
    pub fn with_timeout_or_default(timeout: Duration) -> Self {
        Self::or_default(Self::new(timeout))
    }

    fn or_default(built: Result<Self, CallbackError>) -> Self {
        built.unwrap_or_else(|build_error| {
            warn!(
                component = "callback",
                error = %build_error,
                "falling back to a default callback client"
            );
            Self::with_client(Client::new())
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn deliver(&self, target: &CallbackTarget, body: &[u8]) -> Result<u16, CallbackError> {
        let request = self
            .client
            .put(target.url().clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(""))
            .header(CONTENT_LENGTH, body.len())
            .body(body.to_vec());

        debug!(
            component = "callback",
            host = target.host(),
            port = target.port(),
            path = target.path(),
            bytes = body.len(),
            "sending callback report"
        );
        block_on(async move {
            request
                .send()
                .await
                .map(|response| response.status().as_u16())
                .map_err(|error| CallbackError::Transport(error.to_string()))
        })
    }
}
