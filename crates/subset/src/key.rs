//! Order-independent keys for character subsets.
//!
//! A key names the *multiset* of characters in a subset request: `"abc123"`
//! and `"321cba"` share a key, `"aab"` and `"ab"` don't. Keys are embedded in
//! artifact filenames, so they use the URL-safe base64 alphabet (`A-Z`,
//! `a-z`, `0-9`, `-`, `_`) and are truncated to a short prefix of the digest.
//!
//! The default of [`DEFAULT_KEY_LENGTH`] characters keeps 72 bits of the
//! BLAKE3 digest. That's plenty for the handful of subsets a project ever
//! requests; widen it (up to [`MAX_KEY_LENGTH`], the full digest) if a
//! collision would be costly.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use derive_more::Display;

/// Default number of key characters (6 bits each).
pub const DEFAULT_KEY_LENGTH: usize = 12;
/// Length of a base64-encoded, unpadded 32-byte BLAKE3 digest.
pub const MAX_KEY_LENGTH: usize = 43;

/// A short, filename-safe identifier for a character subset.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub struct SubsetKey(String);
impl SubsetKey {
    /// Derives the key for `subset`, truncated to `length` characters.
    ///
    /// Characters are Unicode scalar values, so astral characters count once
    /// each. `length` is clamped to `1..=MAX_KEY_LENGTH`.
    ///
    /// ```
    /// use glyphcut_subset::{DEFAULT_KEY_LENGTH, SubsetKey};
    ///
    /// let key = SubsetKey::derive("abc123", DEFAULT_KEY_LENGTH);
    /// assert_eq!(key, SubsetKey::derive("321cba", DEFAULT_KEY_LENGTH));
    /// assert_ne!(key, SubsetKey::derive("xyz789", DEFAULT_KEY_LENGTH));
    /// assert_eq!(key.as_str().len(), DEFAULT_KEY_LENGTH);
    /// ```
    pub fn derive(subset: &str, length: usize) -> Self {
        // Sorting gives every permutation of the multiset the same canonical
        // sequence. UTF-8 is prefix-free, so concatenating the encoded
        // characters can't make two different sequences collide.
        let mut chars: Vec<char> = subset.chars().collect();
        chars.sort_unstable();
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0; 4];
        for ch in chars {
            hasher.update(ch.encode_utf8(&mut buffer).as_bytes());
        }
        let mut encoded = URL_SAFE_NO_PAD.encode(hasher.finalize().as_bytes());
        // Infallible: the base64 alphabet is ASCII, so every index is a
        // character boundary.
        encoded.truncate(length.clamp(1, MAX_KEY_LENGTH));
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for SubsetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(subset: &str) -> SubsetKey {
        SubsetKey::derive(subset, DEFAULT_KEY_LENGTH)
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(key("abc123"), key("abc123"));
        assert!(!key("abc123").as_str().is_empty());
    }

    #[rstest]
    #[case("abc123", "321cba")]
    #[case("Hello World", "World Hello")]
    #[case("a𝔸b", "b𝔸a")]
    #[case("ééa", "aéé")]
    fn test_permutations_share_a_key(#[case] left: &str, #[case] right: &str) {
        assert_eq!(key(left), key(right));
    }

    #[rstest]
    #[case("abc123", "xyz789")]
    #[case("ab", "aab")]
    #[case("", " ")]
    #[case("a", "A")]
    fn test_different_multisets_differ(#[case] left: &str, #[case] right: &str) {
        assert_ne!(key(left), key(right));
    }

    #[test]
    fn test_chars_not_bytes() {
        // "é" precomposed is one character; "e" + combining acute is two.
        assert_ne!(key("\u{e9}"), key("e\u{301}"));
        assert_eq!(key("\u{1d538}\u{1d539}"), key("\u{1d539}\u{1d538}"));
    }

    #[rstest]
    #[case(8, 8)]
    #[case(DEFAULT_KEY_LENGTH, DEFAULT_KEY_LENGTH)]
    #[case(MAX_KEY_LENGTH, MAX_KEY_LENGTH)]
    #[case(0, 1)]
    #[case(100, MAX_KEY_LENGTH)]
    fn test_length_is_clamped(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(SubsetKey::derive("abc", requested).as_str().len(), expected);
    }

    #[test]
    fn test_shorter_keys_are_prefixes() {
        let full = SubsetKey::derive("latin", MAX_KEY_LENGTH);
        let short = SubsetKey::derive("latin", 8);
        assert!(full.as_str().starts_with(short.as_str()));
    }

    #[test]
    fn test_filename_safe_alphabet() {
        for subset in ["", "abc", "0123456789", "日本語", "!@#$%^&*()"] {
            let key = SubsetKey::derive(subset, MAX_KEY_LENGTH);
            assert!(
                key.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {key}"
            );
        }
    }
}
