//! Deterministic in-memory subsetter for tests.

use crate::error::{ErrorKind, Result};
use crate::subsetter::Subsetter;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// A [`Subsetter`] that doesn't understand fonts at all.
///
/// The "subset" it produces is a header naming the distinct requested
/// characters followed by the untouched input, which is enough for tests to
/// check which font and which characters reached the subsetter. Every call is
/// recorded.
#[derive(Debug, Default)]
pub struct MockSubsetter {
    calls: Mutex<Vec<(Vec<u8>, String)>>,
    failing: bool,
}
impl MockSubsetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A subsetter that rejects every font as invalid.
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    /// What [`subset`](Subsetter::subset) returns for this input.
    pub fn expected_output(font: &[u8], chars: &str) -> Vec<u8> {
        let distinct: String = chars.chars().collect::<BTreeSet<_>>().into_iter().collect();
        let mut output = format!("mock-subset[{distinct}]\n").into_bytes();
        output.extend_from_slice(font);
        output
    }

    /// Every `(font, chars)` pair received so far, in call order.
    pub fn calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl Subsetter for MockSubsetter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn subset(&self, font: Vec<u8>, chars: &str) -> Result<Vec<u8>> {
        let output = Self::expected_output(&font, chars);
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push((font, chars.to_string()));
        if self.failing {
            exn::bail!(ErrorKind::InvalidFont("mock subsetter always fails".to_string()));
        }
        Ok(output)
    }
}
