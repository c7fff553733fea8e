//! Dispatch service: target resolution plus the transport hand-off.
//!
//! # Design
//! `DispatchService` holds the endpoint, the current transport and the
//! alias map. The transport and alias cells are last-write-wins; every call
//! snapshots the transport when it starts, so swapping transports never
//! affects a call already in flight.
//!
//! `resolve` is pure and usable without any transport (the FFI crate and
//! host-does-I/O callers use it directly). `send` checks for a transport and
//! resolves the request eagerly, before returning its future, so
//! misconfiguration and malformed URLs are reported without ever reaching
//! the transport.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::compose::compose_url;
use crate::config::DispatchConfig;
use crate::error::{BoxError, DispatchError};
use crate::http::{HttpMethod, RequestDescriptor, RequestOptions, ResponseDescriptor};
use crate::placeholder::substitute_params;
use crate::target::parse_target;

/// Executes resolved requests.
///
/// Failures may be reported either as `Err` or as a response with
/// `ok: Some(false)`; the service passes both through unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        target: &str,
        request: RequestDescriptor,
    ) -> Result<ResponseDescriptor, BoxError>;
}

#[async_trait]
impl<F, Fut> Transport for F
where
    F: Fn(String, RequestDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ResponseDescriptor, BoxError>> + Send,
{
    async fn send(
        &self,
        target: &str,
        request: RequestDescriptor,
    ) -> Result<ResponseDescriptor, BoxError> {
        (self)(target.to_string(), request).await
    }
}

pub type DispatchFuture = BoxFuture<'static, Result<ResponseDescriptor, DispatchError>>;

pub struct DispatchService {
    endpoint: String,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    pub(crate) aliases: RwLock<BTreeMap<String, String>>,
}

impl std::fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchService")
            .field("endpoint", &self.endpoint)
            .field("has_transport", &self.has_transport())
            .field("aliases", &self.aliases())
            .finish()
    }
}

impl DispatchService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport: RwLock::new(None),
            aliases: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn from_config(config: DispatchConfig) -> Self {
        Self::new(config.endpoint).with_aliases(config.aliases)
    }

    pub fn with_transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.use_transport(transport);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace the active transport for all subsequent calls.
    pub fn use_transport<T: Transport + 'static>(&self, transport: T) {
        self.set_transport(Arc::new(transport));
    }

    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        let mut slot = self.transport.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = slot.replace(transport).is_some();
        debug!(endpoint = %self.endpoint, replaced, "transport registered");
    }

    pub fn has_transport(&self) -> bool {
        self.current_transport().is_some()
    }

    fn current_transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve `target` and `options` into a request descriptor.
    ///
    /// Explicit `options.method` beats the target's method, and
    /// `options.url` (then `options.path`) beats the target's path.
    pub fn resolve(
        &self,
        target: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, DispatchError> {
        let parsed = parse_target(target);
        let method = options.method.or(parsed.method);
        let template = options
            .url
            .as_deref()
            .or(options.path.as_deref())
            .unwrap_or(parsed.path);

        let path = substitute_params(template, &options.params);
        let url = compose_url(&self.endpoint, &path, &options.query)?;

        debug!(
            api_target = target,
            method = method.as_ref().map_or("-", HttpMethod::as_str),
            url = %url,
            "resolved request"
        );

        Ok(RequestDescriptor {
            method,
            url,
            headers: options.headers,
            body: options.body,
        })
    }

    /// Resolve and hand the request to the current transport.
    pub fn send(&self, target: &str, options: RequestOptions) -> DispatchFuture {
        let Some(transport) = self.current_transport() else {
            warn!(api_target = target, "send called without a transport");
            return future::ready(Err(DispatchError::NoHandler)).boxed();
        };
        let request = match self.resolve(target, options) {
            Ok(request) => request,
            Err(e) => return future::ready(Err(e)).boxed(),
        };
        let target = target.to_string();

        async move {
            transport.send(&target, request).await.map_err(|e| {
                warn!(api_target = %target, error = %e, "transport failed");
                DispatchError::Transport(e)
            })
        }
        .boxed()
    }
}
