//! Asynchronous JSON request client with CSRF header injection.
//!
//! # Overview
//! `RequestClient::send` issues one HTTP request with a JSON body and an
//! `X-CSRFToken` header, returns immediately, and later hands the result to
//! exactly one of two callbacks: the parsed JSON of a 200 response, or the
//! status code and raw text of anything else.
//!
//! # Design
//! - The CSRF token is injected (`with_csrf_token`, `ClientConfig`) instead
//!   of being read from page state. Without a token the header is omitted.
//! - Request building and response parsing are plain-data steps
//!   (`build_request`, `parse_response`, `settle`), so hosts can do the I/O
//!   themselves; `Transport` is the seam when the client does it.
//! - A 200 response whose body is not JSON is an error that propagates
//!   through the `Pending` handle; no callback runs for it.

pub mod client;
pub mod config;
pub mod csrf;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{Pending, RequestClient};
pub use config::ClientConfig;
pub use csrf::{CsrfToken, CSRF_HEADER};
pub use error::RequestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Outcome, Request};
