//! Error types for the fluent client.
//!
//! # Design
//! One variant per failure stage of a dispatch: building the request,
//! encoding the body, talking to the transport, running caller-supplied
//! callbacks, and decoding the response. Transport failures keep the
//! original error as their source so callers can downcast to the
//! transport's own error type.

use thiserror::Error;

/// Boxed error returned by caller-supplied callbacks and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL plus path did not parse as an absolute URL.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header name or value passed to a setter was not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The outgoing request could not be assembled.
    #[error("failed to build request: {0}")]
    RequestError(#[from] http::Error),

    /// Query parameters from a value must serialize to a flat JSON object.
    #[error("query parameters must serialize to a JSON object, got {0}")]
    QueryShapeError(&'static str),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// A form file could not be opened or read.
    #[error("form field '{field}': {source}")]
    FormIoError {
        field: String,
        #[source]
        source: std::io::Error,
    },

    /// An open form file has no name to report as its filename.
    #[error("form file for field '{0}' has no name")]
    UnnamedFormFile(String),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    TransportError(#[source] BoxError),

    #[error("hook failed: {0}")]
    HookError(#[source] BoxError),

    #[error("stream consumer failed: {0}")]
    StreamError(#[source] BoxError),

    #[error("interceptor failed: {0}")]
    InterceptorError(#[source] BoxError),

    /// The response body could not be read to completion.
    #[error("reading response body failed: {0}")]
    BodyReadError(#[source] std::io::Error),

    /// The response body could not be deserialized into the output target.
    #[error("deserialization failed: {0}")]
    DeserializationError(#[source] serde_json::Error),

    /// An environment variable held an unusable value.
    #[error("invalid configuration for {key}: {reason}")]
    ConfigError { key: &'static str, reason: String },
}

impl ClientError {
    /// Wrap any transport-level error, keeping it as the source.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ClientError::TransportError(err.into())
    }
}
