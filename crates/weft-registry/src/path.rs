//! Registry path grammar.
//!
//! Paths use the same separators as event topics (`.`, `/`, `\`) but
//! keep their case. A leading segment equal to the registry's root
//! namespace is dropped, so `weft.session.id` and `session/id` address
//! the same node of a registry whose namespace is `weft`.

/// Root namespace stripped from the head of paths unless configured otherwise.
pub const DEFAULT_ROOT_NAMESPACE: &str = "weft";

const SEPARATORS: [char; 3] = ['.', '/', '\\'];

/// Splits `path` into segments, dropping one leading `root_namespace`
/// segment.
///
/// Empty segments are dropped and whitespace around a segment is
/// trimmed. An empty result addresses the whole tree.
///
/// ```
/// use weft_registry::split_path;
///
/// assert_eq!(split_path("weft.Session/ID", "weft"), ["Session", "ID"]);
/// assert_eq!(split_path("//a\\b.", "weft"), ["a", "b"]);
/// assert!(split_path("weft", "weft").is_empty());
/// assert!(split_path("  ", "weft").is_empty());
/// ```
#[must_use]
pub fn split_path(path: &str, root_namespace: &str) -> Vec<String> {
    let mut segments = path
        .split(SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .peekable();

    if !root_namespace.is_empty() && segments.peek() == Some(&root_namespace) {
        segments.next();
    }

    segments.map(str::to_string).collect()
}

/// Joins segments back into the canonical `a/b/c` form used in errors
/// and logs.
pub(crate) fn join(segments: &[String]) -> String {
    segments.join("/")
}
