//! C-ABI wrapper around `dispatch-core`.
//!
//! # Overview
//! Exposes target resolution, aliases and error normalization through
//! `extern "C"` functions so a host written in any language with a C FFI can
//! resolve targets into requests and execute them with its own HTTP stack.
//! The transport half of the service is deliberately absent: the host is the
//! transport.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Request options cross the boundary as a JSON object string.
//! - A single `FfiDispatchResult` envelope conveys resolved requests and
//!   errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `dispatch_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use dispatch_core::{RequestError, RequestErrorParams, RequestOptions};
use tracing::debug;

use types::*;

/// Borrow a C string as `&str`. Invalid UTF-8 reads as empty.
fn borrow_str<'a>(s: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(s) }.to_str().unwrap_or("")
}

/// Parse caller-supplied options JSON. Null means no options.
fn parse_options(options_json: *const c_char) -> Result<RequestOptions, String> {
    if options_json.is_null() {
        return Ok(RequestOptions::default());
    }
    let raw = borrow_str(options_json);
    if raw.trim().is_empty() {
        return Ok(RequestOptions::default());
    }
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new dispatch client bound to `endpoint`.
///
/// Returns null if `endpoint` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `dispatch_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_client_new(endpoint: *const c_char) -> *mut FfiDispatchClient {
    catch_unwind(|| {
        if endpoint.is_null() {
            return std::ptr::null_mut();
        }
        let service = dispatch_core::DispatchService::new(borrow_str(endpoint));
        Box::into_raw(Box::new(FfiDispatchClient { inner: service }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `dispatch_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_client_free(client: *mut FfiDispatchClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Bind `name` to `target`, replacing any earlier binding.
///
/// Returns false if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_set_alias(
    client: *const FfiDispatchClient,
    name: *const c_char,
    target: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() || name.is_null() || target.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        client.inner.set_alias(borrow_str(name), borrow_str(target));
        true
    })
    .unwrap_or(false)
}

/// Target bound to `name`, or null when unknown.
///
/// The caller must free the returned string with `dispatch_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_alias_target(
    client: *const FfiDispatchClient,
    name: *const c_char,
) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() || name.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.alias_target(borrow_str(name)) {
            Some(target) => c_string(target),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `target` with options given as a JSON object (may be null).
///
/// The caller must free the result with `dispatch_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_resolve(
    client: *const FfiDispatchClient,
    target: *const c_char,
    options_json: *const c_char,
) -> *mut FfiDispatchResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiDispatchResult::null_arg("client");
        }
        if target.is_null() {
            return FfiDispatchResult::null_arg("target");
        }
        let client = unsafe { &*client };
        let options = match parse_options(options_json) {
            Ok(options) => options,
            Err(reason) => return FfiDispatchResult::invalid_options(&reason),
        };
        match client.inner.resolve(borrow_str(target), options) {
            Ok(req) => FfiDispatchResult::ok(req),
            Err(e) => FfiDispatchResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiDispatchResult::panic("panic in dispatch_resolve"))
}

/// Resolve the target registered under `name`.
///
/// The caller must free the result with `dispatch_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_resolve_alias(
    client: *const FfiDispatchClient,
    name: *const c_char,
    options_json: *const c_char,
) -> *mut FfiDispatchResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiDispatchResult::null_arg("client");
        }
        if name.is_null() {
            return FfiDispatchResult::null_arg("name");
        }
        let client = unsafe { &*client };
        let options = match parse_options(options_json) {
            Ok(options) => options,
            Err(reason) => return FfiDispatchResult::invalid_options(&reason),
        };
        match client.inner.resolve_alias(borrow_str(name), options) {
            Ok(req) => FfiDispatchResult::ok(req),
            Err(e) => FfiDispatchResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiDispatchResult::panic("panic in dispatch_resolve_alias"))
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

/// Build a normalized error for a failed response the host received.
///
/// `status_text` may be null. Never returns null except on panic.
/// The caller must free the result with `dispatch_free_error`.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_normalize_response(
    status: u16,
    status_text: *const c_char,
) -> *mut FfiRequestError {
    catch_unwind(|| {
        let status_text = (!status_text.is_null()).then(|| borrow_str(status_text).to_string());
        let err = RequestError::new(RequestErrorParams {
            status: Some(status),
            status_text,
            ..RequestErrorParams::default()
        });
        debug!(status, message = %err.message, "normalized response error");
        FfiRequestError::from_core(err)
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `dispatch_resolve*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_free_result(result: *mut FfiDispatchResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.request.is_null() {
            unsafe { FfiRequest::free(result.request) };
        }
    });
}

/// Free an error returned by `dispatch_normalize_response`. Safe with null.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_free_error(err: *mut FfiRequestError) {
    if err.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let err = unsafe { Box::from_raw(err) };
        free_c_string(err.name);
        free_c_string(err.message);
        free_c_string(err.status_text);
    });
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn dispatch_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};

    use super::*;

    fn cstr(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn read(s: *const c_char) -> String {
        unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string()
    }

    fn client(endpoint: &str) -> *mut FfiDispatchClient {
        let endpoint = cstr(endpoint);
        let client = dispatch_client_new(endpoint.as_ptr());
        assert!(!client.is_null());
        client
    }

    #[test]
    fn client_new_and_free() {
        let c = client("https://a.com");
        dispatch_client_free(c);
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(dispatch_client_new(std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        dispatch_client_free(std::ptr::null_mut());
    }

    #[test]
    fn resolve_wiktionary_scenario() {
        let c = client("https://en.wiktionary.org");
        let target = cstr("GET /:section");
        let options = cstr(r#"{"params":{"section":"w"},"query":{"search":"example","fulltext":1}}"#);

        let result = dispatch_resolve(c, target.as_ptr(), options.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        let req = unsafe { &*r.request };
        assert_eq!(read(req.method), "GET");
        assert_eq!(read(req.url), "https://en.wiktionary.org/w?search=example&fulltext=1");
        assert!(req.headers.is_null());
        assert_eq!(req.headers_len, 0);
        assert!(req.body.is_null());

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn resolve_carries_headers_and_body() {
        let c = client("https://a.com");
        let target = cstr("POST /items");
        let options = cstr(r#"{"headers":{"content-type":"application/json"},"body":"{}"}"#);

        let result = dispatch_resolve(c, target.as_ptr(), options.as_ptr());
        let req = unsafe { &*(*result).request };
        assert_eq!(req.headers_len, 1);
        let header = unsafe { &*req.headers };
        assert_eq!(read(header.key), "content-type");
        assert_eq!(read(header.value), "application/json");
        assert_eq!(read(req.body), "{}");

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn resolve_without_method_has_null_method() {
        let c = client("https://a.com");
        let target = cstr("/status");
        let result = dispatch_resolve(c, target.as_ptr(), std::ptr::null());
        let req = unsafe { &*(*result).request };
        assert!(req.method.is_null());
        assert_eq!(read(req.url), "https://a.com/status");

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn resolve_invalid_endpoint() {
        let c = client("/relative");
        let target = cstr("GET /x");
        let result = dispatch_resolve(c, target.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::InvalidUrl);
        assert!(r.request.is_null());
        assert!(read(r.error_message).contains("/relative"));

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn resolve_bad_options_json() {
        let c = client("https://a.com");
        let target = cstr("GET /x");
        let options = cstr("{not json");
        let result = dispatch_resolve(c, target.as_ptr(), options.as_ptr());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidOptions);

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn resolve_null_args() {
        let target = cstr("GET /x");
        let result = dispatch_resolve(std::ptr::null(), target.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(read(r.error_message), "null argument: client");
        dispatch_free_result(result);

        let c = client("https://a.com");
        let result = dispatch_resolve(c, std::ptr::null(), std::ptr::null());
        assert_eq!(read(unsafe { &*result }.error_message), "null argument: target");
        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn aliases_resolve_like_targets() {
        let c = client("https://en.wiktionary.org");
        let name = cstr("search");
        let target = cstr("GET /w");
        assert!(dispatch_set_alias(c, name.as_ptr(), target.as_ptr()));

        let bound = dispatch_alias_target(c, name.as_ptr());
        assert_eq!(read(bound), "GET /w");
        dispatch_free_string(bound);

        let options = cstr(r#"{"query":{"search":"example"}}"#);
        let result = dispatch_resolve_alias(c, name.as_ptr(), options.as_ptr());
        let req = unsafe { &*(*result).request };
        assert_eq!(read(req.url), "https://en.wiktionary.org/w?search=example");

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn unknown_alias() {
        let c = client("https://a.com");
        let name = cstr("missing");
        assert!(dispatch_alias_target(c, name.as_ptr()).is_null());

        let result = dispatch_resolve_alias(c, name.as_ptr(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::UnknownAlias);

        dispatch_free_result(result);
        dispatch_client_free(c);
    }

    #[test]
    fn set_alias_null_returns_false() {
        let c = client("https://a.com");
        let name = cstr("x");
        assert!(!dispatch_set_alias(c, name.as_ptr(), std::ptr::null()));
        assert!(!dispatch_set_alias(std::ptr::null(), name.as_ptr(), name.as_ptr()));
        dispatch_client_free(c);
    }

    #[test]
    fn normalize_response_builds_message() {
        let text = cstr("Not Found");
        let err = dispatch_normalize_response(404, text.as_ptr());
        let e = unsafe { &*err };
        assert_eq!(read(e.name), "RequestError");
        assert_eq!(read(e.message), "404 Not Found");
        assert_eq!(e.status, 404);
        assert_eq!(read(e.status_text), "Not Found");
        dispatch_free_error(err);
    }

    #[test]
    fn normalize_response_defaults() {
        let err = dispatch_normalize_response(0, std::ptr::null());
        let e = unsafe { &*err };
        assert_eq!(read(e.message), "Unspecified");
        assert_eq!(read(e.status_text), "");
        dispatch_free_error(err);
    }

    #[test]
    fn free_null_is_safe() {
        dispatch_free_result(std::ptr::null_mut());
        dispatch_free_error(std::ptr::null_mut());
        dispatch_free_string(std::ptr::null_mut());
    }
}
