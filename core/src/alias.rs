//! Named shorthands for targets.
//!
//! # Design
//! Two ways to expose aliases:
//! - the service's own registry (`set_alias` / `call`), shared by every
//!   caller of that service;
//! - `assign`, which returns a `BoundAliases` snapshot and leaves the
//!   registry untouched.
//!
//! Names are plain map keys, so an alias can never shadow a method of the
//! service. Re-registering a name overwrites its target.

use std::collections::BTreeMap;
use std::sync::PoisonError;

use futures::future::{self, FutureExt};
use tracing::debug;

use crate::error::DispatchError;
use crate::http::{RequestDescriptor, RequestOptions};
use crate::service::{DispatchFuture, DispatchService};

impl DispatchService {
    pub fn with_aliases<I, K, V>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.set_aliases(aliases);
        self
    }

    /// Bind `name` to `target`, replacing any earlier binding.
    pub fn set_alias(&self, name: impl Into<String>, target: impl Into<String>) {
        let name = name.into();
        let target = target.into();
        debug!(alias = %name, api_target = %target, "alias registered");
        self.aliases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, target);
    }

    pub fn set_aliases<I, K, V>(&self, aliases: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, target) in aliases {
            self.set_alias(name, target);
        }
    }

    pub fn alias_target(&self, name: &str) -> Option<String> {
        self.aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Snapshot of the registry.
    pub fn aliases(&self) -> BTreeMap<String, String> {
        self.aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send through a registered alias; same as `send(target, options)`.
    pub fn call(&self, name: &str, options: RequestOptions) -> DispatchFuture {
        match self.alias_target(name) {
            Some(target) => self.send(&target, options),
            None => future::ready(Err(DispatchError::UnknownAlias(name.to_string()))).boxed(),
        }
    }

    pub fn resolve_alias(
        &self,
        name: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, DispatchError> {
        let target = self
            .alias_target(name)
            .ok_or_else(|| DispatchError::UnknownAlias(name.to_string()))?;
        self.resolve(&target, options)
    }

    /// Bind a set of aliases without touching the registry.
    pub fn assign<I, K, V>(&self, aliases: I) -> BoundAliases<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        BoundAliases {
            service: self,
            targets: aliases
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Alias snapshot produced by `DispatchService::assign`.
#[derive(Debug)]
pub struct BoundAliases<'a> {
    service: &'a DispatchService,
    targets: BTreeMap<String, String>,
}

impl BoundAliases<'_> {
    pub fn call(&self, name: &str, options: RequestOptions) -> DispatchFuture {
        match self.targets.get(name) {
            Some(target) => self.service.send(target, options),
            None => future::ready(Err(DispatchError::UnknownAlias(name.to_string()))).boxed(),
        }
    }

    pub fn resolve(
        &self,
        name: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, DispatchError> {
        let target = self
            .targets
            .get(name)
            .ok_or_else(|| DispatchError::UnknownAlias(name.to_string()))?;
        self.service.resolve(target, options)
    }

    pub fn target(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}
