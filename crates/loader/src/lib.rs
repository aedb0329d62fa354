//! Build-time font subsetting for stylesheets.
//!
//! A host build tool hands [`FontSubsetPlugin::load`] every module identifier
//! it resolves. Identifiers such as `src/styles/fonts.css?subset=Hello` are
//! handled:
//!
//! 1. The stylesheet is read and its `@font-face` sources are extracted.
//! 2. Each local font is subset to the requested characters and written to
//!    the output directory as `reduced_<key>_<file>`, where the key depends
//!    only on which characters were requested.
//! 3. The stylesheet is returned with every source pointing at its subset.
//!
//! Any other identifier is left to the host.

pub mod error;
mod artifact;
mod plugin;
mod request;
mod store;

pub use crate::artifact::{ARTIFACT_PREFIX, Artifact, is_remote, rewrite, target_file_name};
pub use crate::plugin::{Enforce, FontSubsetPlugin, PLUGIN_NAME};
pub use crate::request::{Match, ModuleRequest, SUBSET_PARAM, split_id, to_slash};
pub use crate::store::ArtifactStore;
