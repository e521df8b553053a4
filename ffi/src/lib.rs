//! C-ABI wrapper around `request-core`.
//!
//! # Overview
//! Lets a host that owns the network stack use the request client: the host
//! asks for a request as plain data, performs the round-trip itself, then
//! hands the response back and receives exactly one callback.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `request_settle` is synchronous: the callback has run by the time it
//!   returns. A 200 response with a non-JSON body returns `MalformedJson`
//!   and invokes neither callback.
//! - The C caller owns returned pointers and must release them with the
//!   matching `request_*_free` function.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use request_core::{CsrfToken, HttpResponse, RequestClient};

use types::*;

/// Read a nullable C string. `Err` carries the code to report.
fn read_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>, FfiErrorCode> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| FfiErrorCode::InvalidUtf8)
}

fn set_error(out: *mut FfiErrorCode, code: FfiErrorCode) {
    if !out.is_null() {
        unsafe { *out = code };
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client. Both arguments may be null: without `base_url` only
/// absolute urls are accepted, without `csrf_token` the `X-CSRFToken`
/// header is omitted.
///
/// Returns null on invalid UTF-8 or an internal panic. Free the result with
/// `request_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn request_client_new(
    base_url: *const c_char,
    csrf_token: *const c_char,
) -> *mut FfiRequestClient {
    catch_unwind(|| {
        let (base_url, csrf_token) = match (read_str(base_url), read_str(csrf_token)) {
            (Ok(b), Ok(t)) => (b, t),
            _ => return std::ptr::null_mut(),
        };
        let mut client = RequestClient::new().with_csrf_token(csrf_token.and_then(CsrfToken::new));
        if let Some(base_url) = base_url {
            client = client.with_base_url(base_url);
        }
        Box::into_raw(Box::new(FfiRequestClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `request_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn request_client_free(client: *mut FfiRequestClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the HTTP request for `method url` with a JSON body.
///
/// `body_json` is JSON text; null means JSON `null`. Returns null on error
/// and, when `error_out` is non-null, stores the reason there. Free the
/// result with `request_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn request_build(
    client: *const FfiRequestClient,
    url: *const c_char,
    method: *const c_char,
    body_json: *const c_char,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    let result = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || url.is_null() || method.is_null() {
            return Err(FfiErrorCode::NullArg);
        }
        let client = unsafe { &*client };
        let url = read_str(url)?.unwrap_or_default();
        let method = read_str(method)?.unwrap_or_default();
        let body: serde_json::Value = match read_str(body_json)? {
            Some(text) => serde_json::from_str(text).map_err(|_| FfiErrorCode::InvalidBody)?,
            None => serde_json::Value::Null,
        };

        let request = client
            .inner
            .prepare(url, method, &body)
            .map_err(|e| FfiErrorCode::from(&e))?;
        Ok(FfiHttpRequest::from_core(client.inner.build_request(&request)))
    }))
    .unwrap_or(Err(FfiErrorCode::Panic));

    match result {
        Ok(req) => {
            set_error(error_out, FfiErrorCode::Ok);
            req
        }
        Err(code) => {
            set_error(error_out, code);
            std::ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Settle
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Deliver a response to exactly one callback.
///
/// Status 200 calls `on_success` with the parsed JSON re-serialized; any
/// other status calls `on_failure` with the raw body. `ctx` is passed
/// through untouched. Returns `Ok` once a callback has run, `MalformedJson`
/// if a 200 body is not JSON (no callback runs), or `NullArg`.
#[unsafe(no_mangle)]
pub extern "C" fn request_settle(
    client: *const FfiRequestClient,
    response: *const FfiHttpResponse,
    ctx: *mut c_void,
    on_success: FfiSuccessCallback,
    on_failure: FfiFailureCallback,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || response.is_null() {
            return FfiErrorCode::NullArg;
        }
        let (Some(on_success), Some(on_failure)) = (on_success, on_failure) else {
            return FfiErrorCode::NullArg;
        };
        let client = unsafe { &*client };
        let response = ffi_response_to_core(unsafe { &*response });

        let settled = client.inner.settle(
            response,
            |value| {
                let json = to_c_string(value.to_string());
                on_success(ctx, json.as_ptr());
            },
            |status, body| {
                let body = to_c_string(body);
                on_failure(ctx, status, body.as_ptr());
            },
        );
        match settled {
            Ok(()) => FfiErrorCode::Ok,
            Err(e) => FfiErrorCode::from(&e),
        }
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `request_build`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn request_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
