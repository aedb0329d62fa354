//! The loader pipeline.

use crate::artifact::{Artifact, rewrite};
use crate::error::{ErrorKind, Result};
use crate::request::ModuleRequest;
use crate::store::{ArtifactStore, normalize};
use exn::ResultExt;
use glyphcut_config::{CachePolicy, Config};
use glyphcut_css::extract_font_references;
use glyphcut_subset::{SubsetKey, SubsetterHandle};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

/// Name the loader registers under.
pub const PLUGIN_NAME: &str = "glyphcut";

/// When the host should run this loader relative to its own loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforce {
    Pre,
    Post,
}

/// What happened to a single font source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    /// The font was subset and written to this path.
    Generated(PathBuf),
    /// An artifact already existed at this path and was kept.
    Reused(PathBuf),
}

/// Handles stylesheet requests carrying a `subset` query.
///
/// For each local `@font-face` source of the requested stylesheet, a subset
/// of the font is written to the configured output directory, and the
/// returned CSS points at it instead of the original. Requests share nothing
/// but the filesystem, so one plugin can serve concurrent requests behind an
/// `Arc`.
pub struct FontSubsetPlugin {
    root: PathBuf,
    config: Config,
    store: ArtifactStore,
    subsetter: SubsetterHandle,
}
impl FontSubsetPlugin {
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` isn't
    /// absolute, and [`Config`](ErrorKind::Config) if the configuration
    /// fails [`Config::validate`]. Relative stylesheet paths and a relative
    /// `target_base_path` resolve against `root`.
    pub fn new(root: impl AsRef<Path>, config: Config, subsetter: SubsetterHandle) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        let config = config.validate().or_raise(|| ErrorKind::Config)?;
        let root = normalize(root);
        let store = ArtifactStore::new(root.join(&config.target_base_path))?;
        Ok(Self { root, config, store, subsetter })
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn enforce(&self) -> Enforce {
        Enforce::Pre
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Loads a module identifier.
    ///
    /// Returns `None` when the identifier isn't a stylesheet with a `subset`
    /// query, so the host should load it some other way.
    pub async fn load(&self, id: &str) -> Result<Option<String>> {
        match ModuleRequest::parse(id).matched() {
            Some(request) => Ok(Some(self.transform(&request).await?)),
            None => Ok(None),
        }
    }

    /// Runs the pipeline for one stylesheet and returns the rewritten CSS.
    ///
    /// Sources are processed one at a time, in the order they first appear.
    /// Any failure aborts the whole request; artifacts written before the
    /// failure are left in place.
    #[instrument(skip(self, request), fields(css = %request.css_path.display(), subset_size = request.subset.len()))]
    pub async fn transform(&self, request: &ModuleRequest) -> Result<String> {
        let css_path = normalize(&self.root.join(&request.css_path));
        let css = fs::read_to_string(&css_path).await.or_raise(|| ErrorKind::Stylesheet(css_path.clone()))?;
        let css_dir = css_path.parent().unwrap_or(self.root.as_path());

        let sources = extract_font_references(&css);
        if sources.is_empty() {
            tracing::debug!("Stylesheet references no font sources");
            return Ok(css);
        }
        self.store.ensure_root().await?;

        let key = SubsetKey::derive(&request.subset, self.config.key_length);
        let mut replacements = Vec::with_capacity(sources.len());
        for reference in &sources {
            let Some(artifact) = Artifact::plan(reference, css_dir, &self.store, self.config.naming, &key)? else {
                tracing::debug!(reference = reference.raw.as_str(), "Skipping font source that isn't a local file");
                continue;
            };
            match self.process(&artifact, &request.subset).await? {
                Action::Generated(path) => tracing::info!(
                    source = %artifact.source_path.display(),
                    target = %path.display(),
                    subsetter = self.subsetter.name(),
                    "Processed font"
                ),
                Action::Reused(path) => tracing::debug!(target = %path.display(), "Reusing existing font subset"),
            }
            let replacement = artifact.replacement();
            tracing::debug!(
                reference = artifact.reference.as_str(),
                replacement = replacement.as_str(),
                "Replacing font source"
            );
            replacements.push((artifact.reference, replacement));
        }
        Ok(rewrite(&css, &replacements))
    }

    /// Produces a single artifact, unless the cache policy allows reusing it.
    async fn process(&self, artifact: &Artifact, subset: &str) -> Result<Action> {
        if self.config.cache == CachePolicy::IfMissing && self.store.exists(&artifact.target_file_name).await? {
            return Ok(Action::Reused(artifact.target_path.clone()));
        }
        let font = fs::read(&artifact.source_path)
            .await
            .or_raise(|| ErrorKind::Resolution(artifact.source_path.clone()))?;
        let reduced = self
            .subsetter
            .subset(font, subset)
            .await
            .or_raise(|| ErrorKind::Subset(artifact.source_path.clone()))?;
        let path = self.store.write(&artifact.target_file_name, &reduced).await?;
        Ok(Action::Generated(path))
    }
}

impl fmt::Debug for FontSubsetPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSubsetPlugin")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("store", &self.store)
            .field("subsetter", &self.subsetter.name())
            .finish()
    }
}
