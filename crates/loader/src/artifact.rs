//! Planning and applying font source rewrites.

use crate::error::{ErrorKind, Result};
use crate::request::{split_id, to_slash};
use crate::store::{ArtifactStore, normalize};
use exn::OptionExt;
use glyphcut_config::NamingMode;
use glyphcut_css::FontReference;
use glyphcut_subset::SubsetKey;
use std::path::{Component, Path, PathBuf};

/// Prefix shared by every artifact file name.
pub const ARTIFACT_PREFIX: &str = "reduced_";

/// One font source of a stylesheet, and where its subset goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The reference exactly as written in the stylesheet, escapes included.
    pub reference: String,
    /// `?` or `#` suffix of the reference (e.g. `?#iefix`), kept when rewriting.
    pub suffix: String,
    pub source_path: PathBuf,
    pub source_file_name: String,
    pub target_file_name: String,
    pub target_path: PathBuf,
}
impl Artifact {
    /// Plans the artifact for `reference`, found in a stylesheet in `css_dir`.
    ///
    /// References resolve against the stylesheet's directory, including ones
    /// starting with `/`. Returns `None` for references that aren't local
    /// files (see [`is_remote`]).
    pub fn plan(
        reference: &FontReference,
        css_dir: &Path,
        store: &ArtifactStore,
        naming: NamingMode,
        key: &SubsetKey,
    ) -> Result<Option<Self>> {
        if is_remote(&reference.value) {
            return Ok(None);
        }
        let (file, suffix) = split_id(&reference.value);
        // `url(my%20font.woff2)` means a file with a space in its name.
        let file = urlencoding::decode(file).map_or_else(|_| file.to_string(), |decoded| decoded.into_owned());
        let relative = file.trim_start_matches('/');
        // Directories (`fonts/`, `..`) and empty references don't name a font.
        let names_file = !relative.ends_with('/')
            && matches!(Path::new(relative).components().next_back(), Some(Component::Normal(_)));
        if !names_file {
            exn::bail!(ErrorKind::InvalidPath(css_dir.join(relative)));
        }
        let source_path = normalize(&css_dir.join(relative));
        let source_file_name = source_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_raise(|| ErrorKind::InvalidPath(source_path.clone()))?;
        let target_file_name = target_file_name(naming, key, &source_file_name);
        let target_path = store.absolute_path(&target_file_name)?;
        Ok(Some(Self {
            reference: reference.raw.clone(),
            suffix: suffix.to_string(),
            source_path,
            source_file_name,
            target_file_name,
            target_path,
        }))
    }

    /// What the reference is rewritten to: the forward-slash target path,
    /// followed by the original suffix.
    pub fn replacement(&self) -> String {
        format!("{}{}", to_slash(&self.target_path), self.suffix)
    }
}

/// `reduced_<file>` or `reduced_<key>_<file>`.
///
/// ```
/// use glyphcut_config::NamingMode;
/// use glyphcut_loader::target_file_name;
/// use glyphcut_subset::SubsetKey;
///
/// let key = SubsetKey::derive("abc", 8);
/// assert_eq!(target_file_name(NamingMode::Plain, &key, "a.woff2"), "reduced_a.woff2");
/// assert_eq!(target_file_name(NamingMode::Keyed, &key, "a.woff2"), format!("reduced_{key}_a.woff2"));
/// ```
pub fn target_file_name(naming: NamingMode, key: &SubsetKey, source_file_name: &str) -> String {
    match naming {
        NamingMode::Plain => format!("{ARTIFACT_PREFIX}{source_file_name}"),
        NamingMode::Keyed => format!("{ARTIFACT_PREFIX}{key}_{source_file_name}"),
    }
}

/// Whether a reference points somewhere other than the local filesystem:
/// protocol-relative (`//host/...`) or carrying a URL scheme (`data:`,
/// `https:`, ...).
///
/// Single-letter schemes are Windows drive letters, so `C:/fonts/a.ttf` is
/// local.
pub fn is_remote(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Replaces every occurrence of each `(from, to)` pair in one pass.
///
/// The longest match wins at each position, so `a.woff` can't clobber part
/// of `a.woff2`, and replacement text is never scanned again.
///
/// ```
/// use glyphcut_loader::rewrite;
///
/// let css = "src: url(a.woff2), url(a.woff);";
/// let replacements = [("a.woff".to_string(), "/out/1".to_string()), ("a.woff2".to_string(), "/out/2".to_string())];
/// assert_eq!(rewrite(css, &replacements), "src: url(/out/2), url(/out/1);");
/// ```
pub fn rewrite(css: &str, replacements: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = replacements.iter().filter(|(from, _)| !from.is_empty()).collect();
    ordered.sort_by(|(left, _), (right, _)| right.len().cmp(&left.len()));

    let mut output = String::with_capacity(css.len());
    let mut rest = css;
    'scan: while let Some(ch) = rest.chars().next() {
        for (from, to) in &ordered {
            if let Some(remaining) = rest.strip_prefix(from.as_str()) {
                output.push_str(to);
                rest = remaining;
                continue 'scan;
            }
        }
        output.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcut_subset::DEFAULT_KEY_LENGTH;
    use rstest::rstest;

    fn plan(reference: &str, naming: NamingMode) -> Result<Option<Artifact>> {
        let store = ArtifactStore::new("/project/src/.font-subsets").unwrap();
        let key = SubsetKey::derive("abc", DEFAULT_KEY_LENGTH);
        Artifact::plan(&FontReference::from(reference), Path::new("/project/src/styles"), &store, naming, &key)
    }

    fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(from, to)| (from.to_string(), to.to_string())).collect()
    }

    #[test]
    fn test_plan_keyed() {
        let artifact = plan("../fonts/a.woff2", NamingMode::Keyed).unwrap().unwrap();
        let key = SubsetKey::derive("cba", DEFAULT_KEY_LENGTH);
        assert_eq!(artifact.reference, "../fonts/a.woff2");
        assert_eq!(artifact.source_path, Path::new("/project/src/fonts/a.woff2"));
        assert_eq!(artifact.source_file_name, "a.woff2");
        assert_eq!(artifact.target_file_name, format!("reduced_{key}_a.woff2"));
        assert_eq!(artifact.target_path, Path::new("/project/src/.font-subsets").join(&artifact.target_file_name));
        assert_eq!(artifact.replacement(), format!("/project/src/.font-subsets/reduced_{key}_a.woff2"));
    }

    #[test]
    fn test_plan_plain() {
        let artifact = plan("a.ttf", NamingMode::Plain).unwrap().unwrap();
        assert_eq!(artifact.target_file_name, "reduced_a.ttf");
        assert_eq!(artifact.source_path, Path::new("/project/src/styles/a.ttf"));
    }

    #[rstest]
    #[case("/fonts/a.woff2", "/project/src/styles/fonts/a.woff2")]
    #[case("./a.woff2", "/project/src/styles/a.woff2")]
    #[case("../../a.woff2", "/project/a.woff2")]
    #[case("my%20font.woff2", "/project/src/styles/my font.woff2")]
    fn test_source_resolves_against_css_dir(#[case] reference: &str, #[case] expected: &str) {
        let artifact = plan(reference, NamingMode::Keyed).unwrap().unwrap();
        assert_eq!(artifact.source_path, Path::new(expected));
    }

    #[test]
    fn test_suffix_is_kept_for_rewrite_only() {
        let artifact = plan("legacy.eot?#iefix", NamingMode::Plain).unwrap().unwrap();
        assert_eq!(artifact.source_path, Path::new("/project/src/styles/legacy.eot"));
        assert_eq!(artifact.target_file_name, "reduced_legacy.eot");
        assert_eq!(artifact.suffix, "?#iefix");
        assert_eq!(artifact.replacement(), "/project/src/.font-subsets/reduced_legacy.eot?#iefix");
    }

    #[test]
    fn test_escaped_reference_is_replaced_as_written() {
        let store = ArtifactStore::new("/project/src/.font-subsets").unwrap();
        let key = SubsetKey::derive("abc", DEFAULT_KEY_LENGTH);
        let reference = FontReference { value: "a.woff2".to_string(), raw: r"a\2e woff2".to_string() };
        let artifact = Artifact::plan(&reference, Path::new("/project/src/styles"), &store, NamingMode::Plain, &key)
            .unwrap()
            .unwrap();
        assert_eq!(artifact.source_path, Path::new("/project/src/styles/a.woff2"));
        assert_eq!(artifact.reference, r"a\2e woff2");
        let css = r"src: url('a\2e woff2');";
        assert_eq!(
            rewrite(css, &[(artifact.reference.clone(), artifact.replacement())]),
            "src: url('/project/src/.font-subsets/reduced_a.woff2');"
        );
    }

    #[rstest]
    #[case("fonts/")]
    #[case("..")]
    #[case("/")]
    fn test_plan_without_file_name(#[case] reference: &str) {
        let err = plan(reference, NamingMode::Keyed).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("data:font/woff2;base64,AAAA", true)]
    #[case("https://fonts.example.com/a.woff2", true)]
    #[case("http://example.com/a.ttf", true)]
    #[case("//cdn.example.com/a.ttf", true)]
    #[case("blob+x-y.z:anything", true)]
    #[case("fonts/a.woff2", false)]
    #[case("/fonts/a.woff2", false)]
    #[case("C:/fonts/a.woff2", false)]
    #[case("a.woff2?v=1:2", false)]
    #[case("1abc:foo", false)]
    fn test_is_remote(#[case] reference: &str, #[case] expected: bool) {
        assert_eq!(is_remote(reference), expected);
        if expected {
            assert_eq!(plan(reference, NamingMode::Keyed).unwrap(), None);
        }
    }

    #[test]
    fn test_rewrite_every_occurrence() {
        let css = "a { src: url(x.ttf); } b { src: url('x.ttf'); }";
        assert_eq!(
            rewrite(css, &pairs(&[("x.ttf", "/out/x.ttf")])),
            "a { src: url(/out/x.ttf); } b { src: url('/out/x.ttf'); }"
        );
    }

    #[test]
    fn test_rewrite_prefers_longest_reference() {
        let css = "url(a.woff) url(a.woff2) url(a.woff)";
        let replacements = pairs(&[("a.woff", "/o/1.woff"), ("a.woff2", "/o/2.woff2")]);
        assert_eq!(rewrite(css, &replacements), "url(/o/1.woff) url(/o/2.woff2) url(/o/1.woff)");
    }

    #[test]
    fn test_rewrite_does_not_rescan_replacements() {
        // The replacement for `a.ttf` contains `b.ttf`.
        let replacements = pairs(&[("a.ttf", "/out/b.ttf"), ("b.ttf", "/out/c.ttf")]);
        assert_eq!(rewrite("url(a.ttf) url(b.ttf)", &replacements), "url(/out/b.ttf) url(/out/c.ttf)");
    }

    #[rstest]
    #[case("", &[("a", "b")], "")]
    #[case("unchanged", &[], "unchanged")]
    #[case("ignore empty", &[("", "x")], "ignore empty")]
    #[case("日本 a.ttf 語", &[("a.ttf", "/o/a.ttf")], "日本 /o/a.ttf 語")]
    fn test_rewrite_edges(#[case] css: &str, #[case] replacements: &[(&str, &str)], #[case] expected: &str) {
        assert_eq!(rewrite(css, &pairs(replacements)), expected);
    }
}
