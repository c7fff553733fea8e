//! Target string parsing.
//!
//! A target is `"<METHOD> <path>"` when it starts with a run of uppercase
//! ASCII letters followed by whitespace; otherwise the whole string is the
//! path. The method token is not checked against a list of HTTP verbs.

use crate::http::HttpMethod;

/// Method and path template extracted from a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget<'a> {
    pub method: Option<HttpMethod>,
    pub path: &'a str,
}

pub fn parse_target(target: &str) -> ParsedTarget<'_> {
    let token_len = target
        .bytes()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    let rest = &target[token_len..];

    if token_len == 0 || !rest.starts_with(char::is_whitespace) {
        return ParsedTarget {
            method: None,
            path: target,
        };
    }

    ParsedTarget {
        method: Some(HttpMethod::from_token(&target[..token_len])),
        path: rest.trim_start(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_method_and_path() {
        let parsed = parse_target("GET /items/:id");
        assert_eq!(parsed.method, Some(HttpMethod::Get));
        assert_eq!(parsed.path, "/items/:id");
    }

    #[test]
    fn any_uppercase_token_is_a_method() {
        let parsed = parse_target("PUBLISH\tchannel/:name");
        assert_eq!(parsed.method, Some(HttpMethod::Other("PUBLISH".to_string())));
        assert_eq!(parsed.path, "channel/:name");
    }

    #[test]
    fn runs_of_whitespace_are_one_separator() {
        let parsed = parse_target("POST   /items");
        assert_eq!(parsed.method, Some(HttpMethod::Post));
        assert_eq!(parsed.path, "/items");
    }

    #[test]
    fn no_prefix_means_whole_target_is_path() {
        for target in ["/items/:id", "get /items", "GET/items", "GETx /items", ""] {
            let parsed = parse_target(target);
            assert_eq!(parsed.method, None, "{target}");
            assert_eq!(parsed.path, target, "{target}");
        }
    }

    #[test]
    fn absolute_url_after_method() {
        let parsed = parse_target("DELETE https://api.example.com/x");
        assert_eq!(parsed.method, Some(HttpMethod::Delete));
        assert_eq!(parsed.path, "https://api.example.com/x");
    }
}
