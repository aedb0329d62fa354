//! CSS parsing for font subsetting.
//!
//! Stylesheets are parsed with [`cssparser`] into a small typed tree of
//! [`Node`]s, and declaration values into a tree of [`Value`]s. Neither parser
//! ever fails: fragments that can't be understood are skipped, so broken or
//! empty CSS simply produces fewer nodes.
//!
//! The primary entry point is [`extract_font_sources`], which returns the
//! unique `url(...)` references of every top-level `@font-face` rule's `src`
//! declarations, in the order they first appear.

mod extract;
mod node;
mod value;

pub use crate::extract::{FontReference, extract_font_references, extract_font_sources};
pub use crate::node::{AtRule, Declaration, Node, Rule, parse_stylesheet};
pub use crate::value::{Text, Value, parse_value, walk_values};
