//! Request and outcome types.
//!
//! # Design
//! A `Request` is validated once, when it is prepared, and then consumed by
//! a single dispatch. It is never reused: every call prepares a fresh one
//! with its own `id`, which only serves to correlate log lines.

use serde_json::Value;
use uuid::Uuid;

use crate::csrf::CsrfToken;
use crate::http::HttpMethod;

/// A validated request ready to be turned into an `HttpRequest`.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: Uuid,
    pub url: String,
    pub method: HttpMethod,
    pub body: Value,
    pub csrf_token: Option<CsrfToken>,
}

/// Terminal result of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Status 200 with a JSON body.
    Success(Value),
    /// Any other status, or a transport failure (status 0). The body is the
    /// raw response text.
    Failure { status: u16, body: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Invoke exactly one of the two callbacks with this outcome.
    pub fn dispatch<S, F>(self, on_success: S, on_failure: F)
    where
        S: FnOnce(Value),
        F: FnOnce(u16, String),
    {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure { status, body } => on_failure(status, body),
        }
    }
}
