//! Error types for the HTTP functions
//!
//! Errors are classified by who has to act:
//! - Validation / Unauthorized / NotFound: the caller sent something wrong
//! - Upstream: a third-party service failed or refused
//! - Configuration: the server is missing a key it needs

use thiserror::Error;

use crate::integrations::IntegrationError;

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Server misconfigured: {0}")]
    Configuration(String),
}

impl FunctionError {
    pub fn missing_field(field: &str) -> Self {
        FunctionError::Validation(format!("Missing required field: {}", field))
    }

    pub fn not_configured(key: &str) -> Self {
        FunctionError::Configuration(format!("{} is not set", key))
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            FunctionError::Validation(_) => ErrorType::Validation,
            FunctionError::Unauthorized(_) => ErrorType::Unauthorized,
            FunctionError::NotFound(_) => ErrorType::NotFound,
            FunctionError::Upstream(_) => ErrorType::Upstream,
            FunctionError::Configuration(_) => ErrorType::Configuration,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            FunctionError::Validation(_) => 400,
            FunctionError::Unauthorized(_) => 401,
            FunctionError::NotFound(_) => 404,
            FunctionError::Upstream(_) => 502,
            FunctionError::Configuration(_) => 500,
        }
    }
}

impl From<IntegrationError> for FunctionError {
    fn from(err: IntegrationError) -> Self {
        match err.status() {
            Some(404) => FunctionError::NotFound(err.to_string()),
            _ => FunctionError::Upstream(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Validation,
    Unauthorized,
    NotFound,
    Upstream,
    Configuration,
}

/// JSON body of every failed function call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl From<&FunctionError> for ErrorEnvelope {
    fn from(err: &FunctionError) -> Self {
        ErrorEnvelope {
            error: err.to_string(),
        }
    }
}
