use serde::{Deserialize, Serialize};

pub const LIST_SUCCESS_MESSAGE: &str = "Products retrieved successfully";
pub const LIST_FAILURE_MESSAGE: &str = "Failed to retrieve products";
pub const GET_SUCCESS_MESSAGE: &str = "Product retrieved successfully";
pub const GET_FAILURE_MESSAGE: &str = "Failed to retrieve product";
pub const MISSING_ID_MESSAGE: &str = "Product ID is required";
pub const NOT_FOUND_MESSAGE: &str = "Product not found";

/// Headers attached to every read API response, success or error, so browser
/// clients on any origin can consume the API.
pub const RESPONSE_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization",
    ),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required input missing. Client fault, not retried.
    InvalidRequest,
    /// Key absent from the store.
    NotFound,
    /// Store or transport failure. Callers may retry.
    InternalError,
}

impl ErrorCode {
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
    pub timestamp: String,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T, message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
    pub timestamp: String,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
            },
            timestamp: timestamp.into(),
        }
    }
}
