//! Absolute URL composition from an endpoint, a path and a query map.
//!
//! # Design
//! Relative paths are joined onto the endpoint's own path with exactly one
//! `/` between them, regardless of how either half is slashed. Paths that
//! carry a scheme are used standalone and the endpoint is ignored. Query
//! entries are appended with form URL-encoding; null entries are skipped.

use url::Url;

use crate::error::DispatchError;
use crate::http::ParamMap;

/// True when `path` starts with a URL scheme (`https:`, `mailto:`, ...).
pub fn is_absolute_url(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

pub fn compose_url(endpoint: &str, path: &str, query: &ParamMap) -> Result<String, DispatchError> {
    let mut url = if is_absolute_url(path) {
        parse(path)?
    } else {
        let mut base = parse(endpoint)?;
        if !path.is_empty() {
            join_path(&mut base, path);
        }
        base
    };

    let mut pairs = query.rendered().peekable();
    // `query_pairs_mut` leaves a dangling `?` when nothing is appended.
    if pairs.peek().is_some() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url.into())
}

fn parse(raw: &str) -> Result<Url, DispatchError> {
    Url::parse(raw).map_err(|e| DispatchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn join_path(base: &mut Url, relative: &str) {
    let prefix = base.path();
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    let joined = format!("{prefix}/{relative}");
    base.set_path(&joined);
}
