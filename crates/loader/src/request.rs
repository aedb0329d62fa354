//! Module identifiers.
//!
//! The host hands the loader opaque identifiers such as
//! `/src/styles/fonts.css?subset=Hello%20World&inline`. Only stylesheets
//! carrying a `subset` query parameter are handled; everything else is
//! passed over without error.

use std::path::{Path, PathBuf};
use url::form_urlencoded;

/// Name of the query parameter that carries the characters to keep.
pub const SUBSET_PARAM: &str = "subset";

/// A stylesheet request this loader handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    /// Percent-decoded stylesheet path, as written in the identifier.
    pub css_path: PathBuf,
    /// Decoded characters to keep. May be empty.
    pub subset: String,
}

/// The result of matching an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    Matched(ModuleRequest),
    /// Anything that isn't a `.css` path with a `subset` query parameter.
    NotMatched,
}
impl Match {
    pub fn matched(self) -> Option<ModuleRequest> {
        match self {
            Self::Matched(request) => Some(request),
            Self::NotMatched => None,
        }
    }
}

impl ModuleRequest {
    /// Matches an identifier against `<path>.css?subset=<chars>`.
    ///
    /// The query is form-url-decoded (so `+` is a space) and the first
    /// `subset` parameter wins. Fragments are ignored, and an identifier
    /// whose path doesn't decode to UTF-8 simply doesn't match. This never
    /// fails.
    ///
    /// ```
    /// use glyphcut_loader::{Match, ModuleRequest};
    ///
    /// let Match::Matched(request) = ModuleRequest::parse("/a/fonts.css?subset=abc") else {
    ///     panic!("should match");
    /// };
    /// assert_eq!(request.subset, "abc");
    /// assert_eq!(ModuleRequest::parse("/a/app.js?subset=abc"), Match::NotMatched);
    /// ```
    pub fn parse(id: &str) -> Match {
        let (path, params) = split_id(id);
        // Params starting with `#` are all fragment.
        let Some(query) = params.strip_prefix('?') else {
            return Match::NotMatched;
        };
        let query = query.split_once('#').map_or(query, |(query, _)| query);
        let Ok(path) = urlencoding::decode(path) else {
            return Match::NotMatched;
        };
        if !path.ends_with(".css") {
            return Match::NotMatched;
        }
        let subset = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == SUBSET_PARAM)
            .map(|(_, value)| value.into_owned());
        match subset {
            Some(subset) => Match::Matched(Self { css_path: PathBuf::from(path.into_owned()), subset }),
            None => Match::NotMatched,
        }
    }
}

/// Splits an identifier before its first `?` or `#`.
///
/// The second half keeps its delimiter and is empty when there is none.
///
/// ```
/// use glyphcut_loader::split_id;
///
/// assert_eq!(split_id("main.css?subset=latin#top"), ("main.css", "?subset=latin#top"));
/// assert_eq!(split_id("main.css"), ("main.css", ""));
/// ```
pub fn split_id(id: &str) -> (&str, &str) {
    match id.find(['?', '#']) {
        Some(index) => id.split_at(index),
        None => (id, ""),
    }
}

/// Renders a path with forward slashes only, as stylesheets expect.
pub fn to_slash(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matched(css_path: &str, subset: &str) -> Match {
        Match::Matched(ModuleRequest { css_path: PathBuf::from(css_path), subset: subset.to_string() })
    }

    #[rstest]
    #[case("src/styles/main.css?subset=latin", "src/styles/main.css", "?subset=latin")]
    #[case("src/styles/main.css?subset=latin&display=swap", "src/styles/main.css", "?subset=latin&display=swap")]
    #[case("src/styles/main.css", "src/styles/main.css", "")]
    #[case("main.css#top?subset=a", "main.css", "#top?subset=a")]
    #[case("main.css?a#b?c", "main.css", "?a#b?c")]
    #[case("?subset=a", "", "?subset=a")]
    #[case("", "", "")]
    fn test_split_id(#[case] id: &str, #[case] path: &str, #[case] params: &str) {
        assert_eq!(split_id(id), (path, params));
    }

    #[rstest]
    #[case("/path/to/styles.css?subset=abc123", matched("/path/to/styles.css", "abc123"))]
    #[case("/path/to/styles.css?subset=", matched("/path/to/styles.css", ""))]
    #[case("/path/to/styles.css?subset", matched("/path/to/styles.css", ""))]
    #[case("/path/to/styles.css?foo=bar&subset=xyz789&baz=qux", matched("/path/to/styles.css", "xyz789"))]
    #[case("/path/to/styles.css?subset=Hello%20World", matched("/path/to/styles.css", "Hello World"))]
    #[case("/path/to/styles.css?subset=Hello+World", matched("/path/to/styles.css", "Hello World"))]
    #[case("/path/to/styles.css?subset=%E6%97%A5%E6%9C%AC", matched("/path/to/styles.css", "日本"))]
    #[case("/path/to/styles.css?subset=a%26b&subset=c", matched("/path/to/styles.css", "a&b"))]
    #[case("/path/to/styles.css?subset=abc#fragment", matched("/path/to/styles.css", "abc"))]
    #[case("/path/my%20fonts/styles.css?subset=a", matched("/path/my fonts/styles.css", "a"))]
    #[case("src/styles.css?subset=a", matched("src/styles.css", "a"))]
    fn test_matches(#[case] id: &str, #[case] expected: Match) {
        assert_eq!(ModuleRequest::parse(id), expected);
    }

    #[rstest]
    #[case("/path/to/styles.css")]
    #[case("/path/to/script.js?subset=abc123")]
    #[case("not-a-valid-url")]
    #[case("")]
    #[case("/path/to/styles.CSS?subset=a")]
    #[case("/path/to/styles.css?other=a")]
    #[case("/path/to/styles.css#?subset=a")]
    #[case("/path/to/styles.css?x=1#subset=a")]
    #[case("/path/to/styles%2Ecss.map?subset=a")]
    #[case("/path/%FF.css?subset=a")]
    fn test_does_not_match(#[case] id: &str) {
        assert_eq!(ModuleRequest::parse(id), Match::NotMatched);
    }

    #[test]
    fn test_matched_option() {
        assert!(ModuleRequest::parse("a.css?subset=a").matched().is_some());
        assert!(ModuleRequest::parse("a.css").matched().is_none());
    }

    #[rstest]
    #[case("C:\\Users\\User\\Documents\\file.txt", "C:/Users/User/Documents/file.txt")]
    #[case("C:\\Users/User\\Documents\\file.txt", "C:/Users/User/Documents/file.txt")]
    #[case("/already/unix", "/already/unix")]
    fn test_to_slash(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(to_slash(path), expected);
    }
}
