//! Key path resolution and namespace matching
//!
//! Key paths are `/`-delimited. A canonical path is absolute and carries
//! exactly one trailing slash (`/robot/pose/`), which lets plain prefix
//! comparison stand in for namespace containment.
//!
//! Callers supply key paths in one of three scopes:
//! - global: `/robot/pose` is used as given
//! - local: `pose` is placed in the caller's enclosing namespace
//!   (`pose` from `/robot/driver` becomes `/robot/pose/`)
//! - private: `~pose` is placed under the caller itself
//!   (`~pose` from `/robot/driver` becomes `/robot/driver/pose/`)

/// Resolve a caller-supplied key path against the caller's own path.
///
/// Private scope concatenates `caller_path + "/" + remainder` verbatim, so a
/// caller path that already ends in `/` yields a doubled separator
/// (`~secret` from `/en/node/` is `/en/node//secret/`). Readers split on
/// non-empty segments, which keeps such keys usable.
pub fn resolve(key_path: &str, caller_path: &str) -> String {
    let path = if key_path.starts_with('/') || key_path.starts_with('~') {
        key_path.to_string()
    } else {
        match caller_namespace(caller_path) {
            Some(namespace) => format!("{}/{}", namespace, key_path),
            None => format!("/{}", key_path),
        }
    };

    let path = ensure_trailing_slash(path);

    match path.strip_prefix('~') {
        Some(rest) => format!("{}/{}", caller_path, rest),
        None => path,
    }
}

/// The namespace enclosing `caller_path`: everything before its final
/// non-empty segment, starting at the first `/`.
///
/// Returns `None` when the caller sits directly in the root namespace
/// (`/node`) or has no `/` at all.
pub fn caller_namespace(caller_path: &str) -> Option<&str> {
    let start = caller_path.find('/')?;
    let tail = &caller_path[start..];

    // the final segment must hold at least one character, which may itself
    // be the optional trailing slash
    let last = tail.len() - tail.chars().last()?.len_utf8();
    let split = tail[..last].rfind('/').filter(|&i| i > 0)?;
    Some(&tail[..split])
}

/// Append a `/` unless the path already ends with one.
pub fn ensure_trailing_slash(path: impl Into<String>) -> String {
    let mut path = path.into();
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Namespace match: true when `candidate` is `namespace` itself or nested
/// anywhere below it. Both sides are expected in canonical form.
pub fn is_subpath(candidate: &str, namespace: &str) -> bool {
    candidate.starts_with(namespace)
}

/// Non-empty `/`-delimited segments of a path.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_namespace_variants() {
        assert_eq!(caller_namespace("/en/node"), Some("/en"));
        assert_eq!(caller_namespace("/en/node/"), Some("/en"));
        assert_eq!(caller_namespace("/a/b/c"), Some("/a/b"));
        assert_eq!(caller_namespace("/node"), None);
        assert_eq!(caller_namespace("/node/"), None);
        assert_eq!(caller_namespace("node"), None);
        assert_eq!(caller_namespace(""), None);
        assert_eq!(caller_namespace("/"), None);
    }

    #[test]
    fn caller_namespace_multibyte_tail() {
        assert_eq!(caller_namespace("/über/knoté"), Some("/über"));
    }

    #[test]
    fn caller_namespace_skips_leading_text() {
        assert_eq!(caller_namespace("x/a/b"), Some("/a"));
    }

    #[test]
    fn trailing_slash_added_once() {
        assert_eq!(ensure_trailing_slash("/a"), "/a/");
        assert_eq!(ensure_trailing_slash("/a/"), "/a/");
        assert_eq!(ensure_trailing_slash(""), "/");
    }

    #[test]
    fn subpath_matches_self_and_descendants() {
        assert!(is_subpath("/a/", "/a/"));
        assert!(is_subpath("/a/b/", "/a/"));
        assert!(!is_subpath("/ab/", "/a/"));
        assert!(is_subpath("/anything/", "/"));
    }

    #[test]
    fn segments_skip_empty() {
        assert_eq!(segments("/en/node//secret/"), vec!["en", "node", "secret"]);
        assert!(segments("/").is_empty());
    }
}
