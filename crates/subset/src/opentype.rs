//! OpenType subsetting backed by [`allsorts`].

use crate::error::{Error, ErrorKind, Result};
use crate::subsetter::Subsetter;
use allsorts::Font;
use allsorts::binary::read::ReadScope;
use allsorts::font::MatchingPresentation;
use allsorts::font_data::FontData;
use allsorts::subset::subset;
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::instrument;

/// Subsets TrueType, OpenType, WOFF and WOFF2 input with [`allsorts`].
///
/// Output is always an uncompressed OpenType (sfnt) binary, whatever the
/// input container was. Subsetting is CPU-bound, so it runs on Tokio's
/// blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllsortsSubsetter;
impl AllsortsSubsetter {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`Subsetter::subset`].
    ///
    /// Characters the font has no glyph for are dropped silently (they map to
    /// `.notdef`, which is always kept).
    #[instrument(skip(font), fields(font_size = font.len()))]
    pub fn subset_blocking(font: &[u8], chars: &str) -> Result<Vec<u8>> {
        let distinct: BTreeSet<char> = chars.chars().collect();
        if distinct.is_empty() {
            exn::bail!(ErrorKind::EmptySubset);
        }

        let font_file = ReadScope::new(font).read::<FontData<'_>>().map_err(invalid_font)?;
        let mut reader = Font::new(font_file.table_provider(0).map_err(invalid_font)?).map_err(invalid_font)?;
        // Glyph 0 (`.notdef`) must always be present.
        let mut glyph_ids = BTreeSet::from([0_u16]);
        let mut missing = 0_usize;
        for ch in distinct {
            let (glyph_id, _) = reader.lookup_glyph_index(ch, MatchingPresentation::NotRequired, None);
            if glyph_id == 0 {
                missing += 1;
            }
            glyph_ids.insert(glyph_id);
        }
        if missing > 0 {
            tracing::debug!(missing, "Font has no glyphs for some requested characters");
        }

        let provider = font_file.table_provider(0).map_err(invalid_font)?;
        let glyph_ids: Vec<u16> = glyph_ids.into_iter().collect();
        subset(&provider, &glyph_ids)
            .map_err(|err| Error::from(ErrorKind::Subset(err.to_string())))
    }
}

fn invalid_font(err: impl Display) -> Error {
    Error::from(ErrorKind::InvalidFont(err.to_string()))
}

#[async_trait]
impl Subsetter for AllsortsSubsetter {
    fn name(&self) -> &str {
        "allsorts"
    }

    async fn subset(&self, font: Vec<u8>, chars: &str) -> Result<Vec<u8>> {
        let chars = chars.to_string();
        tokio::task::spawn_blocking(move || Self::subset_blocking(&font, &chars))
            .await
            .or_raise(|| ErrorKind::Runtime)?
    }
}
