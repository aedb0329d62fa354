use crate::node::{Node, parse_stylesheet};
use crate::value::{Value, parse_value, walk_values};
use std::collections::HashSet;
use tracing::instrument;

/// A `url(...)` of a `@font-face` `src` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontReference {
    /// The reference with CSS escapes resolved: what to look up on disk.
    pub value: String,
    /// The reference as written in the stylesheet: what to replace.
    pub raw: String,
}
impl From<&str> for FontReference {
    fn from(reference: &str) -> Self {
        Self { value: reference.to_string(), raw: reference.to_string() }
    }
}

/// Returns the unique font source references of a stylesheet.
///
/// Only top-level `@font-face` rules are inspected, and within them only
/// direct `src` declarations. Every `url(...)` in those values contributes
/// its first argument; `format(...)`, `tech(...)` and `local(...)` hints are
/// ignored. References keep their first-seen order and exact duplicates are
/// removed.
///
/// ```
/// use glyphcut_css::extract_font_sources;
///
/// let css = "@font-face { src: url('a.woff2') format('woff2'), url(a.woff) format('woff'); }";
/// assert_eq!(extract_font_sources(css), ["a.woff2", "a.woff"]);
/// assert!(extract_font_sources("").is_empty());
/// ```
pub fn extract_font_sources(css: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_font_references(css)
        .into_iter()
        .map(|reference| reference.value)
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Like [`extract_font_sources`], but keeps how each reference was written.
///
/// References are unique by their raw text, so `url(a.ttf)` and
/// `url(a\2e ttf)` are two references to the same file.
///
/// ```
/// use glyphcut_css::extract_font_references;
///
/// let references = extract_font_references(r"@font-face { src: url('a\2e woff2'); }");
/// assert_eq!(references[0].value, "a.woff2");
/// assert_eq!(references[0].raw, r"a\2e woff2");
/// ```
#[instrument(skip(css), fields(css_size = css.len()))]
pub fn extract_font_references(css: &str) -> Vec<FontReference> {
    let mut references = Vec::new();
    for node in parse_stylesheet(css) {
        let Node::AtRule(rule) = node else {
            continue;
        };
        if !rule.is_named("font-face") {
            continue;
        }
        for declaration in rule.declarations().filter(|d| d.is_property("src")) {
            collect_urls(&parse_value(&declaration.value), &mut references);
        }
    }
    let mut seen = HashSet::new();
    references.retain(|reference| seen.insert(reference.raw.clone()));
    tracing::debug!(count = references.len(), "Extracted font sources");
    references
}

/// Empty references (`url()`, `url('')`) point nowhere and are skipped.
fn collect_urls(values: &[Value], references: &mut Vec<FontReference>) {
    walk_values(values, &mut |value| {
        // Unquoted `url(` is tokenized case-insensitively, so quoted ones are
        // matched the same way.
        let url = match value {
            Value::Url(_) => Some(value),
            Value::Function { name, arguments } if name.eq_ignore_ascii_case("url") => arguments.first(),
            _ => None,
        };
        if let Some((value, raw)) = url.and_then(|url| url.text().zip(url.raw()))
            && !value.is_empty()
        {
            references.push(FontReference { value: value.to_string(), raw: raw.to_string() });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_extracts_urls_from_font_face() {
        let css = r#"
            @font-face {
                font-family: 'MyFont';
                src: url('/fonts/myfont.woff2') format('woff2'),
                    url('/fonts/myfont.woff') format('woff');
            }
        "#;
        assert_eq!(extract_font_sources(css), ["/fonts/myfont.woff2", "/fonts/myfont.woff"]);
    }

    #[test]
    fn test_multiple_font_face_rules() {
        let css = r#"
            @font-face {
                font-family: 'FontOne';
                src: url('/fonts/fontone.woff2') format('woff2');
            }
            @font-face {
                font-family: 'FontTwo';
                src: url('/fonts/fonttwo.woff') format('woff');
            }
        "#;
        assert_eq!(extract_font_sources(css), ["/fonts/fontone.woff2", "/fonts/fonttwo.woff"]);
    }

    #[test]
    fn test_removes_duplicates() {
        let css = r#"
            @font-face {
                font-family: 'MyFont';
                src: url('/fonts/myfont.woff2') format('woff2'),
                    url('/fonts/myfont.woff') format('woff');
            }
            @font-face {
                font-family: 'MyFont';
                src: url('/fonts/myfont.woff2') format('woff2');
            }
        "#;
        assert_eq!(extract_font_sources(css), ["/fonts/myfont.woff2", "/fonts/myfont.woff"]);
    }

    #[rstest]
    #[case("")]
    #[case("body { font-family: 'Arial', sans-serif; }")]
    #[case("@font-face { font-family: 'NoSource'; }")]
    #[case("@font-face { src: local('Arial'); }")]
    #[case("@font-face { src: url(); }")]
    #[case("@font-face src: url(a.woff2);")]
    #[case("}{ not css at all")]
    fn test_no_sources(#[case] css: &str) {
        assert!(extract_font_sources(css).is_empty());
    }

    #[test]
    fn test_ignores_urls_outside_src() {
        let css = r#"
            body { background: url(bg.png); }
            @font-face {
                font-family: 'Mixed';
                unicode-range: U+0000-00FF;
                src: url(mixed.ttf);
            }
        "#;
        assert_eq!(extract_font_sources(css), ["mixed.ttf"]);
    }

    #[test]
    fn test_only_top_level_font_faces() {
        let css = r#"
            @media screen {
                @font-face { src: url(nested.woff2); }
            }
            @font-face { src: url(top.woff2); }
        "#;
        assert_eq!(extract_font_sources(css), ["top.woff2"]);
    }

    #[test]
    fn test_mixed_quoting_and_case() {
        let css = r#"
            @font-face { src: URL(upper.ttf), url("double.otf"), Url( 'single.woff' ); }
            @FONT-FACE { src: url(ignored.ttf); }
            @font-face { SRC: url(ignored.ttf); }
        "#;
        assert_eq!(extract_font_sources(css), ["upper.ttf", "double.otf", "single.woff"]);
    }

    #[rstest]
    #[case("@font-face { src: url('a.woff2'); }")]
    #[case("@font-face { src: url(\"a.woff2\") }")]
    #[case("@font-face{src:url(a.woff2)}")]
    #[case("@font-face { src: local(A), url('a.woff2') /* last */; }")]
    fn test_single_source_in_last_position(#[case] css: &str) {
        assert_eq!(extract_font_sources(css), ["a.woff2"]);
    }

    #[test]
    fn test_escaped_references_keep_raw_text() {
        let css = r"@font-face { src: url('a\2e woff2') format('woff2'), url(a.woff2), url(b\.ttf); }";
        let references = extract_font_references(css);
        let pairs: Vec<_> = references.iter().map(|r| (r.value.as_str(), r.raw.as_str())).collect();
        assert_eq!(pairs, [("a.woff2", r"a\2e woff2"), ("a.woff2", "a.woff2"), ("b.ttf", r"b\.ttf")]);
        // Same file, so it is only listed once here.
        assert_eq!(extract_font_sources(css), ["a.woff2", "b.ttf"]);
    }

    #[test]
    fn test_keeps_query_suffixes() {
        let css = r#"@font-face { src: url('legacy.eot?#iefix') format('embedded-opentype'); }"#;
        assert_eq!(extract_font_sources(css), ["legacy.eot?#iefix"]);
    }

    #[test]
    fn test_multiple_src_declarations() {
        let css = "@font-face { src: url(a.eot); src: url(a.woff2) format('woff2'), url(a.eot); }";
        assert_eq!(extract_font_sources(css), ["a.eot", "a.woff2"]);
    }
}
