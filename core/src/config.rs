//! Service configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ENDPOINT_ENV: &str = "DISPATCH_ENDPOINT";
pub const ALIASES_ENV: &str = "DISPATCH_ALIASES";

/// Construction inputs for a `DispatchService`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Absolute base URL that relative targets resolve against.
    pub endpoint: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl DispatchConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            aliases: BTreeMap::new(),
        }
    }

    /// Read `DISPATCH_ENDPOINT` and `DISPATCH_ALIASES`.
    ///
    /// Aliases are `name=TARGET` pairs separated by `;`, e.g.
    /// `search=GET /w;item=GET /items/:id`. Returns `None` without an
    /// endpoint.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV).ok()?;
        let aliases = std::env::var(ALIASES_ENV)
            .map(|raw| parse_aliases(&raw))
            .unwrap_or_default();
        Some(Self { endpoint, aliases })
    }
}

fn parse_aliases(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, target)| (name.trim(), target.trim()))
        .filter(|(name, target)| !name.is_empty() && !target.is_empty())
        .map(|(name, target)| (name.to_string(), target.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DispatchService;

    #[test]
    fn parses_alias_list() {
        let aliases = parse_aliases("search=GET /w; item = GET /items/:id;;bad;empty=");
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases["search"], "GET /w");
        assert_eq!(aliases["item"], "GET /items/:id");
    }

    #[test]
    fn deserializes_without_aliases() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"endpoint":"https://a.com"}"#).unwrap();
        assert_eq!(config, DispatchConfig::new("https://a.com"));
    }

    #[test]
    fn service_from_config_registers_aliases() {
        let config: DispatchConfig = serde_json::from_str(
            r#"{"endpoint":"https://en.wiktionary.org","aliases":{"search":"GET /w"}}"#,
        )
        .unwrap();
        let service = DispatchService::from_config(config);
        assert_eq!(service.endpoint(), "https://en.wiktionary.org");
        assert_eq!(service.alias_target("search").as_deref(), Some("GET /w"));
    }
}
