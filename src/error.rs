//! Error types for wanguard-exporter
//!
//! This module defines the error types used throughout the application.

use std::num::ParseFloatError;
use std::time::Duration;

use thiserror::Error;

/// Broad error category used to decide how a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure or non-2xx status
    Request,
    /// Response content type is not JSON
    Protocol,
    /// Response body is not valid JSON for the requested shape
    Decode,
}

/// API client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request URL could not be built from the base address and path
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[source] url::ParseError),

    /// Transport failure (connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server did not send response headers in time
    #[error("No response headers received within {0:?}")]
    HeaderTimeout(Duration),

    /// Whole exchange, redirects and body included, exceeded its deadline
    #[error("Request did not complete within {0:?}")]
    RequestTimeout(Duration),

    /// Non-2xx response status
    #[error("API returned status {0}")]
    HttpStatus(u16),

    /// Redirect refused by the transport policy
    #[error("Redirect refused: {0}")]
    Redirect(String),

    /// Failure while streaming the response body
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Declared content type is not JSON
    #[error("Expected JSON response, got {0}")]
    UnexpectedContentType(String),

    /// JSON decoding failure
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::UnexpectedContentType(_) => ErrorKind::Protocol,
            ClientError::Decode(_) => ErrorKind::Decode,
            _ => ErrorKind::Request,
        }
    }

    /// HTTP status code, if the failure came from a response status
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// A textual API field could not be converted to a number
#[derive(Error, Debug)]
#[error("Cannot parse '{value}' as a number: {source}")]
pub struct ConversionError {
    /// Offending text
    pub value: String,
    #[source]
    pub source: ParseFloatError,
}

/// Parse API text into a sample value
pub fn parse_value(value: &str) -> Result<f64, ConversionError> {
    value.parse::<f64>().map_err(|source| ConversionError {
        value: value.to_string(),
        source,
    })
}

/// Collector registration errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Two descriptors share the same metric name
    #[error("Duplicate metric descriptor '{name}' (collector '{collector}')")]
    DuplicateDescriptor { name: String, collector: String },

    /// Metric name is not a valid exposition name
    #[error("Invalid metric name '{name}': {reason}")]
    InvalidMetricName { name: String, reason: String },

    /// Label name is not a valid exposition label name
    #[error("Invalid label name '{name}' on metric '{metric}': {reason}")]
    InvalidLabelName {
        metric: String,
        name: String,
        reason: String,
    },

    /// Collector name is used twice
    #[error("Collector '{0}' is already registered")]
    DuplicateCollector(String),
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Registry error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
