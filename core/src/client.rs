//! JSON request client with CSRF header injection.
//!
//! # Design
//! `RequestClient` holds an optional base url, an optional CSRF token and a
//! shared `Transport`. It carries no per-request state: every call prepares
//! a fresh `Request`, dispatches it once and settles it into exactly one
//! `Outcome`.
//!
//! The work is split the same way for every entry point:
//! `prepare` validates input, `build_request` produces plain data,
//! the transport performs the round-trip, and `parse_response` interprets
//! it. `send` runs the last two steps on a tokio task and hands the outcome
//! to one of two `FnOnce` callbacks.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::csrf::{CsrfToken, CSRF_HEADER};
use crate::error::RequestError;
use crate::http::{HttpRequest, HttpResponse, CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Outcome, Request};

/// Handle to a request dispatched by `RequestClient::send`.
///
/// Resolves to `Ok(())` once a callback has run, or to
/// `Err(RequestError::MalformedJson { .. })` when a 200 response could not be
/// parsed, in which case neither callback ran.
pub type Pending = JoinHandle<Result<(), RequestError>>;

pub struct RequestClient<T: Transport = UreqTransport> {
    base_url: Option<String>,
    csrf_token: Option<CsrfToken>,
    transport: Arc<T>,
}

impl<T: Transport> Clone for RequestClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            csrf_token: self.csrf_token.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl RequestClient<UreqTransport> {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let client = Self::new().with_csrf_token(config.csrf_token.clone());
        match &config.base_url {
            Some(base_url) => client.with_base_url(base_url),
            None => client,
        }
    }
}

impl Default for RequestClient<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport + 'static> RequestClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            base_url: None,
            csrf_token: None,
            transport: Arc::new(transport),
        }
    }

    /// Base url that relative request urls are joined onto.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim().trim_end_matches('/').to_string());
        self
    }

    /// Token echoed in `X-CSRFToken`. `None` omits the header.
    pub fn with_csrf_token(mut self, token: Option<CsrfToken>) -> Self {
        self.csrf_token = token;
        self
    }

    pub fn csrf_token(&self) -> Option<&CsrfToken> {
        self.csrf_token.as_ref()
    }

    /// Validate inputs and serialize the body into a fresh `Request`.
    pub fn prepare<B>(&self, url: &str, method: &str, body: &B) -> Result<Request, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve_url(url)?;
        let method = method.parse()?;
        let body = serde_json::to_value(body)?;
        Ok(Request {
            id: Uuid::new_v4(),
            url,
            method,
            body,
            csrf_token: self.csrf_token.clone(),
        })
    }

    pub fn build_request(&self, request: &Request) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string())];
        if let Some(token) = &request.csrf_token {
            headers.push((CSRF_HEADER.to_string(), token.as_str().to_string()));
        }
        let body = request
            .method
            .carries_body()
            .then(|| request.body.to_string());
        HttpRequest {
            method: request.method,
            url: request.url.clone(),
            headers,
            body,
        }
    }

    /// Interpret a response: exactly 200 is success and must carry JSON,
    /// every other status is a failure with the raw body.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Outcome, RequestError> {
        if response.status != 200 {
            return Ok(Outcome::Failure {
                status: response.status,
                body: response.body,
            });
        }
        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => Ok(Outcome::Success(value)),
            Err(e) => Err(RequestError::MalformedJson {
                body: response.body,
                message: e.to_string(),
            }),
        }
    }

    /// Synchronously deliver a response to exactly one callback.
    ///
    /// For hosts that perform the I/O themselves. On malformed JSON neither
    /// callback runs and the error is returned.
    pub fn settle<S, F>(&self, response: HttpResponse, on_success: S, on_failure: F) -> Result<(), RequestError>
    where
        S: FnOnce(Value),
        F: FnOnce(u16, String),
    {
        self.parse_response(response)?.dispatch(on_success, on_failure);
        Ok(())
    }

    /// Run a prepared request through the transport.
    ///
    /// A transport failure settles as `Failure { status: 0, body: "" }`, the
    /// way a browser reports a network error.
    pub async fn dispatch(&self, request: Request) -> Result<Outcome, RequestError> {
        let http_request = self.build_request(&request);
        debug!(
            request_id = %request.id,
            method = %request.method,
            url = %request.url,
            csrf = request.csrf_token.is_some(),
            "dispatching request"
        );

        let response = match self.transport.execute(http_request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(request_id = %request.id, error = %err, "transport failed");
                return Ok(Outcome::Failure {
                    status: 0,
                    body: String::new(),
                });
            }
        };

        let status = response.status;
        match self.parse_response(response) {
            Ok(outcome) => {
                debug!(request_id = %request.id, status, success = outcome.is_success(), "request settled");
                Ok(outcome)
            }
            Err(err) => {
                warn!(request_id = %request.id, error = %err, "unparseable success response");
                Err(err)
            }
        }
    }

    /// Prepare and dispatch in one step, awaiting the outcome.
    pub async fn execute<B>(&self, url: &str, method: &str, body: &B) -> Result<Outcome, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.prepare(url, method, body)?;
        self.dispatch(request).await
    }

    /// Fire a request without waiting for it.
    ///
    /// Returns as soon as the request is validated and spawned on the
    /// current tokio runtime. When it completes, `on_success` receives the
    /// parsed JSON of a 200 response, or `on_failure` receives the status
    /// and raw body of anything else. Callbacks run on a runtime worker.
    ///
    /// Invalid input is reported here and no callback runs. Calling outside
    /// a runtime yields `RequestError::NoRuntime`.
    pub fn send<B, S, F>(
        &self,
        url: &str,
        method: &str,
        body: &B,
        on_success: S,
        on_failure: F,
    ) -> Result<Pending, RequestError>
    where
        B: Serialize + ?Sized,
        S: FnOnce(Value) + Send + 'static,
        F: FnOnce(u16, String) + Send + 'static,
    {
        let request = self.prepare(url, method, body)?;
        let runtime = Handle::try_current().map_err(|_| RequestError::NoRuntime)?;
        let client = self.clone();
        Ok(runtime.spawn(async move {
            client.dispatch(request).await?.dispatch(on_success, on_failure);
            Ok(())
        }))
    }

    fn resolve_url(&self, url: &str) -> Result<String, RequestError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RequestError::InvalidUrl("url is empty".to_string()));
        }
        if has_http_scheme(url) {
            return Ok(url.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!("{base}/{}", url.trim_start_matches('/'))),
            None => Err(RequestError::InvalidUrl(format!(
                "relative url {url} requires a base url"
            ))),
        }
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
