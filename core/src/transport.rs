//! The I/O seam between `RequestClient` and the network.
//!
//! # Design
//! A `Transport` turns an `HttpRequest` into an `HttpResponse`. Every status
//! code comes back as data; only a failed round-trip is an `Err`. Tests swap
//! in an in-memory transport, production uses `UreqTransport`.

use async_trait::async_trait;
use ureq::{Agent, RequestBuilder};

use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// Blocking `ureq` agent driven on tokio's blocking pool.
///
/// The agent has no timeout: a request that never completes never settles.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || run_blocking(&agent, request))
            .await
            .map_err(|e| RequestError::TaskFailed(e.to_string()))?
    }
}

fn run_blocking(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, RequestError> {
    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;
    let url = url.as_str();

    let result = match (method, body) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), &headers).call(),
        (HttpMethod::Head, _) => with_headers(agent.head(url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(url), &headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Delete, None) => with_headers(agent.delete(url), &headers).call(),
        (HttpMethod::Options, Some(body)) => with_headers(agent.options(url), &headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Options, None) => with_headers(agent.options(url), &headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), &headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), &headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(url), &headers).send_empty(),
        (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(url), &headers).send(body.as_bytes()),
        (HttpMethod::Patch, None) => with_headers(agent.patch(url), &headers).send_empty(),
    };
    let mut response = result.map_err(|e| RequestError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    // No size cap, and non-UTF-8 bytes are decoded lossily so the status
    // survives whatever the body holds.
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| RequestError::Transport(e.to_string()))?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(HttpResponse { status, headers, body })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
