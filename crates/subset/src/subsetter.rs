//! The font subsetting seam.

use crate::error::Result;
use async_trait::async_trait;

/// Rebuilds a font binary so it only carries the glyphs needed for a set of
/// characters.
///
/// Implementations receive the complete font file (any container format
/// they understand) and the raw subset string; duplicate characters in the
/// string are allowed and carry no extra meaning. Output must be
/// deterministic for a given input, since artifacts are cached by the
/// subset's key alone.
///
/// # Examples
///
/// ```
/// use glyphcut_subset::{Subsetter, error::Result};
///
/// async fn subset_file(subsetter: &dyn Subsetter, path: &str, chars: &str) -> Result<usize> {
///     let font = std::fs::read(path).unwrap();
///     let reduced = subsetter.subset(font, chars).await?;
///     Ok(reduced.len())
/// }
/// ```
#[async_trait]
pub trait Subsetter: Send + Sync {
    /// Name of the backend (used for logging only).
    fn name(&self) -> &str;

    /// Subsets `font` down to the glyphs for `chars`.
    async fn subset(&self, font: Vec<u8>, chars: &str) -> Result<Vec<u8>>;
}
