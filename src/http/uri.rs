//! Request-path normalization and segment lookup.
//!
//! A request arrives at an entry script (for example `/app/index.php`). The
//! logical path is what follows the script's location, without the query
//! string and without surrounding slashes:
//!
//! | Request URI                  | Script path       | Logical path |
//! |------------------------------|-------------------|--------------|
//! | `/app/index.php/foo/bar?x=1` | `/app/index.php`  | `foo/bar`    |
//! | `/app/foo/bar`               | `/app/index.php`  | `foo/bar`    |
//! | `/app/index.php`             | `/app/index.php`  | ``           |

use memchr::memchr;

/// File name of the entry script, removed from the script path to obtain
/// the mount prefix.
pub const ENTRY_SCRIPT: &str = "index.php";

/// Computes the logical request path.
///
/// Steps:
/// 1. `raw_path == script_path` gives an empty path.
/// 2. Otherwise a leading script path is removed from `raw_path`. When
///    `raw_path` does not start with it, the first literal occurrence of the
///    mount prefix (script path with [`ENTRY_SCRIPT`] removed) is removed
///    instead.
/// 3. Leading and trailing `/` are trimmed.
/// 4. Everything from the first `?` is dropped, along with any `/` left
///    in front of it. This step always runs.
///
/// # Examples
/// ```
/// use http_facade::uri::resolve_path;
///
/// assert_eq!(resolve_path("/app/index.php/foo/bar?x=1", "/app/index.php"), "foo/bar");
/// assert_eq!(resolve_path("/app/foo/bar", "/app/index.php"), "foo/bar");
/// assert_eq!(resolve_path("/app/index.php", "/app/index.php"), "");
/// ```
pub fn resolve_path(raw_path: &str, script_path: &str) -> String {
    if raw_path == script_path {
        return String::new();
    }

    let stripped = match raw_path.strip_prefix(script_path) {
        Some(rest) if !script_path.is_empty() && matches!(rest.bytes().next(), None | Some(b'/' | b'?')) => {
            rest.to_owned()
        }
        _ => raw_path.replacen(&script_path.replace(ENTRY_SCRIPT, ""), "", 1),
    };

    strip_query(stripped.trim_matches('/'))
        .trim_end_matches('/')
        .to_owned()
}

/// Drops the query string, if any.
#[inline]
pub fn strip_query(path: &str) -> &str {
    match memchr(b'?', path.as_bytes()) {
        Some(index) => &path[..index],
        None => path,
    }
}

/// Splits a logical path on `/`.
///
/// Empty elements are kept: `segments("")` is `[""]`, so index `0` always
/// exists.
///
/// # Examples
/// ```
/// use http_facade::uri::segments;
///
/// assert_eq!(segments("foo/bar"), ["foo", "bar"]);
/// assert_eq!(segments(""), [""]);
/// ```
#[inline]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

/// Returns the segment at `index`, `None` when out of range.
#[inline]
pub fn segment(path: &str, index: usize) -> Option<&str> {
    path.split('/').nth(index)
}

/// Parent directory of a `/`-separated path.
///
/// | Input              | Output  |
/// |--------------------|---------|
/// | `/app/index.php`   | `/app`  |
/// | `/index.php`       | `/`     |
/// | `index.php`        | `.`     |
/// | `/app/sub/`        | `/app`  |
/// | ``                 | ``      |
pub fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return path;
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }

    match trimmed.rfind('/') {
        None => ".",
        Some(index) => match trimmed[..index].trim_end_matches('/') {
            "" => "/",
            parent => parent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve() {
        #[rustfmt::skip]
        let cases = [
            ("/app/index.php/foo/bar?x=1", "/app/index.php", "foo/bar"),
            ("/app/index.php",             "/app/index.php", ""),
            ("/app/index.php?x=1",         "/app/index.php", ""),
            ("/app/foo/bar",               "/app/index.php", "foo/bar"),
            ("/app/foo/bar/",              "/app/index.php", "foo/bar"),
            ("/app/foo/bar/?q=1",          "/app/index.php", "foo/bar"),
            ("/app/foo?a=1&b=/c",          "/app/index.php", "foo"),
            ("/foo/bar",                   "/index.php",     "foo/bar"),
            ("/blog/post/12",              "",               "blog/post/12"),
            ("/a//b",                      "/index.php",     "a//b"),
            ("/other/page",                "/app/index.php", "other/page"),
            ("/docs/index.php",            "/index.php",     "docs/index.php"),
            ("/docs/index.php/x",          "/index.php",     "docs/index.php/x"),
            ("",                           "",               ""),
            ("",                           "/index.php",     ""),
            ("?only=query",                "/index.php",     ""),
        ];

        for (raw, script, expected) in cases {
            assert_eq!(resolve_path(raw, script), expected, "{raw:?} / {script:?}");
        }
    }

    #[test]
    fn mount_prefix_first_occurrence_only() {
        assert_eq!(resolve_path("/app/app/x", "/app/index.php"), "app/x");
    }

    #[test]
    fn script_path_only_removed_as_leading_prefix() {
        assert_eq!(resolve_path("/docs/index.php", "/index.php"), "docs/index.php");
        assert_ne!(resolve_path("/x/app/index.php/y", "/app/index.php"), "x/y");
        assert_eq!(resolve_path("/app/index.php/y", "/app/index.php"), "y");
        assert_eq!(resolve_path("/app/index.phpx", "/app/index.php"), "index.phpx");
    }

    #[test]
    fn resolve_is_idempotent() {
        let first = resolve_path("/app/index.php/foo/bar?x=1", "/app/index.php");
        let second = resolve_path("/app/index.php/foo/bar?x=1", "/app/index.php");
        assert_eq!(first, second);
    }

    #[test]
    fn never_contains_query() {
        for raw in ["/a?b", "/a/?b?c", "/?", "/app/index.php/x?y/z"] {
            assert!(!resolve_path(raw, "/app/index.php").contains('?'));
        }
    }

    #[test]
    fn split() {
        assert_eq!(segments("foo/bar"), ["foo", "bar"]);
        assert_eq!(segments("foo"), ["foo"]);
        assert_eq!(segments("a//b"), ["a", "", "b"]);
    }

    #[test]
    fn empty_path_has_one_empty_segment() {
        assert_eq!(segments(""), [""]);
        assert_eq!(segment("", 0), Some(""));
        assert_eq!(segment("", 1), None);
    }

    #[test]
    fn indexed() {
        #[rustfmt::skip]
        let cases = [
            ("foo/bar", 0, Some("foo")),
            ("foo/bar", 1, Some("bar")),
            ("foo/bar", 2, None),
            ("foo/bar", 5, None),
        ];

        for (path, index, expected) in cases {
            assert_eq!(segment(path, index), expected);
        }
    }

    #[test]
    fn parent_directory() {
        #[rustfmt::skip]
        let cases = [
            ("/app/index.php", "/app"),
            ("/index.php",     "/"),
            ("index.php",      "."),
            ("/app/sub/",      "/app"),
            ("/a//b",          "/a"),
            ("/",              "/"),
            ("",               ""),
        ];

        for (path, expected) in cases {
            assert_eq!(dirname(path), expected, "{path:?}");
        }
    }
}
