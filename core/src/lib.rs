//! Target resolution and dispatch engine.
//!
//! # Overview
//! Maps a target such as `"GET /items/:id"` plus `RequestOptions` to a fully
//! resolved `RequestDescriptor` (method, absolute URL, headers, body), then
//! hands it to a caller-supplied `Transport` and returns its result.
//!
//! # Design
//! - `target` splits a target into method and path template.
//! - `placeholder` fills `:name` placeholders from `options.params`.
//! - `compose` joins the path onto the endpoint and appends `options.query`.
//! - `DispatchService` ties these together; `resolve` is pure, `send` adds
//!   the transport hand-off. Aliases bind short names to targets.
//! - The engine performs no I/O of its own: no retries, pooling or caching.
//!
//! ```no_run
//! use dispatch_core::{DispatchService, RequestOptions};
//!
//! let service = DispatchService::new("https://en.wiktionary.org");
//! let request = service
//!     .resolve("GET /:section", RequestOptions::new().param("section", "w").query("search", "example"))
//!     .unwrap();
//! assert_eq!(request.url, "https://en.wiktionary.org/w?search=example");
//! ```

pub mod alias;
pub mod compose;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod placeholder;
pub mod service;
pub mod target;

pub use alias::BoundAliases;
pub use compose::{compose_url, is_absolute_url};
pub use config::DispatchConfig;
pub use error::{BoxError, DispatchError, RequestError, RequestErrorParams};
pub use http::{HttpMethod, ParamMap, RequestDescriptor, RequestOptions, ResponseDescriptor, Scalar};
pub use placeholder::substitute_params;
pub use service::{DispatchFuture, DispatchService, Transport};
pub use target::{parse_target, ParsedTarget};
