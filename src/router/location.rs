//! Location normalisation: hash handling, href and query parsing.

use std::collections::HashMap;

use url::form_urlencoded;

/// A navigation target split into the routable href and its query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Hash-processed, query-stripped path
    pub href: String,
    pub query: HashMap<String, String>,
}

impl Location {
    /// Normalises a raw navigation path.
    ///
    /// With `hash` set every `#` in the path becomes `/`, so `/a#b` routes as
    /// `/a/b`; otherwise the fragment is dropped. The query is everything after
    /// the first `?`, fragment characters included.
    pub fn parse(raw: &str, hash: bool) -> Self {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));

        let path = if hash {
            path.replace('#', "/")
        } else {
            path.split('#').next().unwrap_or_default().to_string()
        };

        Self {
            href: normalize_href(path),
            query: parse_query(query),
        }
    }
}

fn normalize_href(mut path: String) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Decodes an `application/x-www-form-urlencoded` query string.
///
/// Repeated keys resolve to their last value; malformed escapes are kept
/// verbatim. `+` decodes to a space, `%2B` to a literal plus.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
