//! Colon-prefixed path placeholder substitution (`/items/:id`).

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::warn;

use crate::http::ParamMap;

/// Replace every whole-word `:<key>` in `template` with the rendered value.
///
/// Keys are applied in insertion order. Null values are skipped and their
/// placeholders stay in the path verbatim.
pub fn substitute_params(template: &str, params: &ParamMap) -> String {
    let mut path = template.to_string();

    for (key, value) in params.iter() {
        let Some(value) = value.render() else {
            continue;
        };
        let pattern = match placeholder_pattern(key) {
            Ok(Some(pattern)) => pattern,
            Ok(None) => continue,
            Err(e) => {
                warn!(placeholder = key, error = %e, "placeholder pattern rejected");
                continue;
            }
        };
        if pattern.is_match(&path) {
            path = pattern.replace_all(&path, NoExpand(&value)).into_owned();
        }
    }

    if let Some(leftover) = unresolved_placeholder(&path) {
        warn!(path = %path, placeholder = leftover, "unresolved path placeholder");
    }
    path
}

/// Compiled size cap for a single placeholder pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

fn placeholder_pattern(key: &str) -> Result<Option<Regex>, regex::Error> {
    // An empty key would match every bare colon.
    if key.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&format!(r":{}\b", regex::escape(key)))
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map(Some)
}

/// First `:<identifier>` left in a path. Colons followed by a digit or a
/// slash (ports, schemes) are not placeholders.
fn unresolved_placeholder(path: &str) -> Option<&str> {
    path.match_indices(':').find_map(|(start, _)| {
        let rest = &path[start + 1..];
        if !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            return None;
        }
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        Some(&path[start..start + 1 + len])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence() {
        let params = ParamMap::new().with("id", 42);
        assert_eq!(substitute_params("/items/:id/copy/:id", &params), "/items/42/copy/42");
    }

    #[test]
    fn whole_word_only() {
        let params = ParamMap::new().with("id", 1);
        assert_eq!(substitute_params("/a/:id/b/:idx", &params), "/a/1/b/:idx");
    }

    #[test]
    fn other_placeholders_untouched() {
        let params = ParamMap::new().with("section", "w");
        assert_eq!(substitute_params("/:section/:page", &params), "/w/:page");
    }

    #[test]
    fn null_values_leave_placeholder() {
        let params = ParamMap::new().with("id", None::<i64>);
        assert_eq!(substitute_params("/items/:id", &params), "/items/:id");
    }

    #[test]
    fn key_metacharacters_are_literal() {
        let params = ParamMap::new().with("a.b", "x");
        assert_eq!(substitute_params("/:a.b/:aXb", &params), "/x/:aXb");
    }

    #[test]
    fn values_are_not_expanded() {
        let params = ParamMap::new().with("name", "$1${x}");
        assert_eq!(substitute_params("/u/:name", &params), "/u/$1${x}");
    }

    #[test]
    fn insertion_order_applies() {
        // The first substitution introduces a placeholder the second fills.
        let params = ParamMap::new().with("a", ":b").with("b", "done");
        assert_eq!(substitute_params("/:a", &params), "/done");
    }

    #[test]
    fn oversized_key_is_skipped() {
        let key = "k".repeat(500_000);
        assert!(placeholder_pattern(&key).is_err());

        let template = format!("/items/:{key}");
        let params = ParamMap::new().with(key.as_str(), 1);
        assert_eq!(substitute_params(&template, &params), template);
    }

    #[test]
    fn empty_key_is_ignored() {
        assert!(placeholder_pattern("").unwrap().is_none());
        let params = ParamMap::new().with("", "x");
        assert_eq!(substitute_params("/a:/b", &params), "/a:/b");
    }

    #[test]
    fn finds_leftover_placeholders() {
        assert_eq!(unresolved_placeholder("/items/:id/x"), Some(":id"));
        assert_eq!(unresolved_placeholder("/items/1"), None);
        assert_eq!(unresolved_placeholder("/time/12:30"), None);
        assert_eq!(unresolved_placeholder("https://a.com/:slug"), Some(":slug"));
    }
}
