//! Subset keys and font subsetting backends.
//!
//! Two concerns live here:
//!
//! - **Keys**: [`SubsetKey`] turns the characters requested for a subset into
//!   a short, filename-safe identifier that doesn't depend on the order the
//!   characters were written in.
//! - **Subsetting**: the [`Subsetter`] trait is the seam between the loader
//!   pipeline and whatever actually rebuilds font binaries. [`AllsortsSubsetter`]
//!   is the default implementation; the `mock` feature adds a deterministic
//!   [`MockSubsetter`] for tests in other crates.

pub mod error;
mod key;
#[cfg(feature = "mock")]
mod mock;
mod opentype;
mod subsetter;

pub use crate::key::{DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH, SubsetKey};
#[cfg(feature = "mock")]
pub use crate::mock::MockSubsetter;
pub use crate::opentype::AllsortsSubsetter;
pub use crate::subsetter::Subsetter;
use std::sync::Arc;

pub type SubsetterHandle = Arc<dyn Subsetter + Send + Sync>;
