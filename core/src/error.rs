//! Error types for the dispatch engine.
//!
//! # Design
//! `DispatchError` is what every `send`-family call returns. Failures the
//! engine detects itself (`NoHandler`, `InvalidUrl`, `UnknownAlias`) get
//! dedicated variants; whatever the transport reports is carried unchanged
//! in `Transport` so callers can downcast to the transport's own type.
//!
//! `RequestError` is the uniform record consumers destructure: status and
//! status text are always present (zero and empty when unknown).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REQUEST_ERROR_NAME: &str = "RequestError";
pub const DEFAULT_REQUEST_ERROR_MESSAGE: &str = "Unspecified";

/// Boxed error raised by a transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `DispatchService` operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `send` was called before any transport was registered.
    #[error("missing request handler")]
    NoHandler,

    /// The endpoint and path could not be composed into an absolute URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// An alias name has no registered target.
    #[error("unknown alias '{0}'")]
    UnknownAlias(String),

    /// The transport failed; passed through untouched.
    #[error(transparent)]
    Transport(BoxError),
}

impl DispatchError {
    /// Materialize this error as a `RequestError` record.
    ///
    /// Transport errors that already are a `RequestError` are returned as-is.
    pub fn to_request_error(&self) -> RequestError {
        match self {
            DispatchError::Transport(inner) => match inner.downcast_ref::<RequestError>() {
                Some(record) => record.clone(),
                None => RequestError::new(RequestErrorParams {
                    message: Some(inner.to_string()),
                    ..RequestErrorParams::default()
                }),
            },
            engine => RequestError::new(RequestErrorParams {
                message: Some(engine.to_string()),
                data: Some(serde_json::json!({ "kind": engine.kind() })),
                ..RequestErrorParams::default()
            }),
        }
    }

    /// Stable label suitable for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::NoHandler => "no_handler",
            DispatchError::InvalidUrl { .. } => "invalid_url",
            DispatchError::UnknownAlias(_) => "unknown_alias",
            DispatchError::Transport(_) => "transport",
        }
    }
}

/// Loose input for building a `RequestError`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestErrorParams {
    pub name: Option<String>,
    pub message: Option<String>,
    pub status: Option<u16>,
    #[serde(rename = "statusText")]
    pub status_text: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Normalized request failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct RequestError {
    pub name: String,
    pub message: String,
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub data: Option<serde_json::Value>,
}

impl RequestError {
    /// Build the record, filling defaults.
    ///
    /// Without an explicit message, status and status text are joined with
    /// a space (skipping a zero status and an empty text).
    pub fn new(params: RequestErrorParams) -> Self {
        let message = params
            .message
            .filter(|m| !m.is_empty())
            .or_else(|| status_line(params.status, params.status_text.as_deref()))
            .unwrap_or_else(|| DEFAULT_REQUEST_ERROR_MESSAGE.to_string());

        Self {
            name: params
                .name
                .unwrap_or_else(|| DEFAULT_REQUEST_ERROR_NAME.to_string()),
            message,
            status: params.status.unwrap_or(0),
            status_text: params.status_text.unwrap_or_default(),
            data: params.data,
        }
    }

    pub fn from_status(status: u16, status_text: impl Into<String>) -> Self {
        Self::new(RequestErrorParams {
            status: Some(status),
            status_text: Some(status_text.into()),
            ..RequestErrorParams::default()
        })
    }
}

fn status_line(status: Option<u16>, status_text: Option<&str>) -> Option<String> {
    let parts: Vec<String> = status
        .filter(|s| *s != 0)
        .map(|s| s.to_string())
        .into_iter()
        .chain(status_text.filter(|t| !t.is_empty()).map(str::to_string))
        .collect();
    let line = parts.join(" ").trim().to_string();
    (!line.is_empty()).then_some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_known() {
        let err = RequestError::new(RequestErrorParams::default());
        assert_eq!(err.name, DEFAULT_REQUEST_ERROR_NAME);
        assert_eq!(err.message, DEFAULT_REQUEST_ERROR_MESSAGE);
        assert_eq!(err.status, 0);
        assert_eq!(err.status_text, "");
        assert!(err.data.is_none());
    }

    #[test]
    fn message_joins_status_and_text() {
        assert_eq!(RequestError::from_status(503, "Service Unavailable").message, "503 Service Unavailable");
        assert_eq!(RequestError::from_status(500, "").message, "500");
        assert_eq!(RequestError::from_status(0, "Teapot").message, "Teapot");
    }

    #[test]
    fn explicit_message_and_name_win() {
        let err = RequestError::new(RequestErrorParams {
            name: Some("ApiError".to_string()),
            message: Some("quota exceeded".to_string()),
            status: Some(429),
            ..RequestErrorParams::default()
        });
        assert_eq!(err.name, "ApiError");
        assert_eq!(err.message, "quota exceeded");
        assert_eq!(err.status, 429);
        assert_eq!(err.to_string(), "ApiError: quota exceeded");
    }

    #[test]
    fn engine_errors_materialize_as_records() {
        let record = DispatchError::NoHandler.to_request_error();
        assert_eq!(record.name, DEFAULT_REQUEST_ERROR_NAME);
        assert_eq!(record.message, "missing request handler");
        assert_eq!(record.status, 0);
        assert_eq!(record.data.unwrap()["kind"], "no_handler");
    }

    #[test]
    fn transport_request_errors_pass_through() {
        let original = RequestError::from_status(502, "Bad Gateway");
        let err = DispatchError::Transport(Box::new(original.clone()));
        assert_eq!(err.to_string(), "RequestError: 502 Bad Gateway");
        assert_eq!(err.to_request_error(), original);
        assert_eq!(err.kind(), "transport");
    }
}
