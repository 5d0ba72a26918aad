//! Path and query string helpers shared by the registry and the router.

use std::collections::BTreeMap;

/// Query string values, keyed by name.
pub type Query = BTreeMap<String, String>;

/// Values bound to `:param` segments, keyed by parameter name.
pub type Params = BTreeMap<String, String>;

/// A path split into its pathname, query and hash parts.
///
/// `query` and `hash` exclude their `?`/`#` markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PathParts<'a> {
    pub(crate) pathname: &'a str,
    pub(crate) query: &'a str,
    pub(crate) hash: &'a str,
}

/// Split `path` at the first `#` and the first `?` before it.
pub(crate) fn split_path(path: &str) -> PathParts<'_> {
    let (rest, hash) = path.split_once('#').unwrap_or((path, ""));
    let (pathname, query) = rest.split_once('?').unwrap_or((rest, ""));
    PathParts {
        pathname,
        query,
        hash,
    }
}

/// Collapse repeated slashes and strip the leading and trailing slash.
///
/// ```rust
/// # use stack_router::helpers::normalize_pathname;
/// assert_eq!(normalize_pathname("//a///b/"), "a/b");
/// assert_eq!(normalize_pathname("/"), "");
/// ```
pub fn normalize_pathname(pathname: &str) -> String {
    pathname
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Bring a path into the canonical form the router stores: a leading `/`, no duplicate or
/// trailing slashes, and the query and hash kept verbatim when present.
///
/// ```rust
/// # use stack_router::helpers::normalize_path;
/// assert_eq!(normalize_path("test/?a=1"), "/test?a=1");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let parts = split_path(path);
    let mut normalized = format!("/{}", normalize_pathname(parts.pathname));
    if !parts.query.is_empty() {
        normalized.push('?');
        normalized.push_str(parts.query);
    }
    if !parts.hash.is_empty() {
        normalized.push('#');
        normalized.push_str(parts.hash);
    }
    normalized
}

/// Parse a query string (with or without the leading `?`). Later duplicates win.
pub fn parse_query(search: &str) -> Query {
    let search = search.strip_prefix('?').unwrap_or(search);
    if search.is_empty() {
        return Query::new();
    }

    match serde_urlencoded::from_str::<Vec<(String, String)>>(search) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(err) => {
            tracing::warn!(r#"failed to parse query string "{search}": {err}"#);
            Query::new()
        }
    }
}

/// Serialize `query` to a search string including the leading `?`, or an empty string if there
/// is nothing to serialize.
pub fn to_search_string(query: &Query) -> String {
    if query.is_empty() {
        return String::new();
    }

    match serde_urlencoded::to_string(query) {
        Ok(encoded) => format!("?{encoded}"),
        Err(err) => {
            tracing::warn!("failed to serialize query {query:?}: {err}");
            String::new()
        }
    }
}

/// Append `query` to `path`, keeping any query and hash `path` already has.
pub(crate) fn with_query(path: &str, query: &Query) -> String {
    let search = to_search_string(query);
    if search.is_empty() {
        return path.to_string();
    }

    let parts = split_path(path);
    let mut joined = parts.pathname.to_string();
    if parts.query.is_empty() {
        joined.push_str(&search);
    } else {
        joined.push('?');
        joined.push_str(parts.query);
        joined.push('&');
        joined.push_str(&search[1..]);
    }
    if !parts.hash.is_empty() {
        joined.push('#');
        joined.push_str(parts.hash);
    }
    joined
}
