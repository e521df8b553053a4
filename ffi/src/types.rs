//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Callbacks are nullable function
//! pointers (`Option<extern "C" fn>`), which share the layout of a plain C
//! function pointer.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use request_core::{HttpMethod, HttpRequest, RequestClient, RequestError};

/// Opaque handle to a `RequestClient`.
pub struct FfiRequestClient {
    pub(crate) inner: RequestClient,
}

/// Receives the parsed JSON of a 200 response, re-serialized as a
/// NUL-terminated string. The pointer is valid only during the call.
pub type FfiSuccessCallback = Option<extern "C" fn(ctx: *mut c_void, json: *const c_char)>;

/// Receives the status and raw body of any non-200 response. The body
/// pointer is valid only during the call.
pub type FfiFailureCallback = Option<extern "C" fn(ctx: *mut c_void, status: u16, body: *const c_char)>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request as C-compatible plain data. `body` is null when no body
/// is to be sent.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = into_c_string(req.url);
        let body = match req.body {
            Some(b) => into_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            // Boxed slice so `request_free_request` can rebuild it from
            // `headers_len` alone.
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A response the host received. The FFI layer reads but does not free
/// these fields; a null `body` is treated as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MalformedJson = 1,
    InvalidUrl = 2,
    InvalidMethod = 3,
    InvalidBody = 4,
    NullArg = 5,
    InvalidUtf8 = 6,
    Internal = 7,
    Panic = 8,
}

impl From<&RequestError> for FfiErrorCode {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::MalformedJson { .. } => FfiErrorCode::MalformedJson,
            RequestError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            RequestError::InvalidMethod(_) => FfiErrorCode::InvalidMethod,
            RequestError::Serialization(_) => FfiErrorCode::InvalidBody,
            RequestError::Transport(_) | RequestError::NoRuntime | RequestError::TaskFailed(_) => {
                FfiErrorCode::Internal
            }
        }
    }
}

/// Convert to a C string, dropping interior NUL bytes.
pub(crate) fn to_c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

pub(crate) fn into_c_string(s: String) -> *mut c_char {
    to_c_string(s).into_raw()
}
