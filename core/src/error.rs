//! Error types for the request client.
//!
//! # Design
//! Input problems (`InvalidUrl`, `InvalidMethod`, `Serialization`) are raised
//! before anything is dispatched, so no callback fires for them. A non-200
//! status is never an error here: it is a `Failure` outcome delivered to the
//! caller. `MalformedJson` is the one fatal condition of a completed request
//! and is propagated rather than folded into a failure outcome.

use thiserror::Error;

/// Errors returned by `RequestClient` and its transports.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The url was empty, or relative with no base url configured.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The method string is not a supported HTTP verb.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The server answered 200 but the body is not valid JSON.
    #[error("malformed JSON in 200 response: {message}")]
    MalformedJson { body: String, message: String },

    /// The transport could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// `send` was called outside a tokio runtime.
    #[error("no async runtime available to dispatch the request")]
    NoRuntime,

    /// The background task running the request panicked or was cancelled.
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
