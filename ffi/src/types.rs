//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use dispatch_core::{DispatchError, RequestDescriptor, RequestError};

/// Opaque handle to a `DispatchService`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiDispatchClient {
    pub(crate) inner: dispatch_core::DispatchService,
}

/// Owned C string from any Rust string. Interior NULs truncate to empty.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A resolved request. `method` and `body` are null when absent.
#[repr(C)]
pub struct FfiRequest {
    pub method: *mut c_char,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiRequest {
    pub(crate) fn from_core(req: RequestDescriptor) -> *mut Self {
        let method = match req.method {
            Some(m) => c_string(m.as_str()),
            None => std::ptr::null_mut(),
        };
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiRequest {
            method,
            url: c_string(req.url),
            headers,
            headers_len,
            body,
        }))
    }

    /// Release a request and every string it owns.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.method);
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiDispatchResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NoHandler = 1,
    InvalidUrl = 2,
    UnknownAlias = 3,
    InvalidOptions = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

/// Result envelope for resolve operations.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the resolved request. On failure `request` is null and
/// `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiDispatchResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiRequest,
}

impl FfiDispatchResult {
    pub(crate) fn ok(req: RequestDescriptor) -> *mut Self {
        Box::into_raw(Box::new(FfiDispatchResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiRequest::from_core(req),
        }))
    }

    pub(crate) fn from_error(err: DispatchError) -> *mut Self {
        let error_code = match &err {
            DispatchError::NoHandler => FfiErrorCode::NoHandler,
            DispatchError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            DispatchError::UnknownAlias(_) => FfiErrorCode::UnknownAlias,
            DispatchError::Transport(_) => FfiErrorCode::Transport,
        };
        Self::failure(error_code, &err.to_string())
    }

    pub(crate) fn invalid_options(reason: &str) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidOptions, &format!("invalid options: {reason}"))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiDispatchResult {
            error_code,
            error_message: c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }
}

/// A normalized request error exposed to C. All strings are non-null.
#[repr(C)]
pub struct FfiRequestError {
    pub name: *mut c_char,
    pub message: *mut c_char,
    pub status: u16,
    pub status_text: *mut c_char,
}

impl FfiRequestError {
    pub(crate) fn from_core(err: RequestError) -> *mut Self {
        Box::into_raw(Box::new(FfiRequestError {
            name: c_string(err.name),
            message: c_string(err.message),
            status: err.status,
            status_text: c_string(err.status_text),
        }))
    }
}
