//! Configuration loading and validation.
//!
//! Configuration is layered with [`figment`], later sources overriding
//! earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. The user's config file, `config.toml` in the platform config directory
//!    (see [`user_config_file`]).
//! 3. Project files in the project root: `glyphcut.toml`, `glyphcut.yaml`,
//!    `glyphcut.json`.
//! 4. An explicitly requested file (format picked from its extension).
//! 5. Environment variables prefixed with `GLYPHCUT_`, e.g.
//!    `GLYPHCUT_TARGET_BASE_PATH=.cache/fonts`.
//!
//! ```toml
//! target_base_path = "src/.font-subsets"
//! naming = "keyed"      # or "plain"
//! key_length = 12
//! cache = "always"      # or "if_missing"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use glyphcut_subset::{DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override file configuration.
pub const ENV_PREFIX: &str = "GLYPHCUT_";
/// Stem of the project configuration files looked up in the project root.
pub const PROJECT_FILE_STEM: &str = "glyphcut";
/// Default output directory, relative to the project root.
pub const DEFAULT_TARGET_BASE_PATH: &str = "src/.font-subsets";

/// How artifact filenames are derived from source font filenames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// `reduced_<file>`: one artifact per source font, whatever the subset.
    /// Requests for a different subset overwrite it.
    Plain,
    /// `reduced_<key>_<file>`: one artifact per source font and subset.
    #[default]
    Keyed,
}

/// Whether existing artifacts are reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Re-read, re-subset and re-write every artifact on every request.
    #[default]
    Always,
    /// Skip all work for an artifact whose target file already exists. Only
    /// valid with [`NamingMode::Keyed`], where the filename pins the subset.
    IfMissing,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory artifacts are written to. Relative paths are resolved
    /// against the project root.
    #[serde(alias = "targetBasePath")]
    pub target_base_path: PathBuf,
    pub naming: NamingMode,
    /// Number of subset key characters embedded in keyed filenames.
    pub key_length: usize,
    pub cache: CachePolicy,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            target_base_path: PathBuf::from(DEFAULT_TARGET_BASE_PATH),
            naming: NamingMode::default(),
            key_length: DEFAULT_KEY_LENGTH,
            cache: CachePolicy::default(),
        }
    }
}
impl Config {
    /// Loads every configuration layer for the project at `root`.
    ///
    /// `file`, if given, must exist; project files are optional.
    pub fn load(root: impl AsRef<Path>, file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(user) = user_config_file() {
            tracing::debug!(path = %user.display(), "Merging user configuration");
            figment = figment.merge(Toml::file(user));
        }
        let figment = Self::project(figment, root.as_ref(), file)?.merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(&figment)
    }

    /// Merges the project files in `root`, then `file`, on top of `figment`.
    pub fn project(mut figment: Figment, root: &Path, file: Option<&Path>) -> Result<Figment> {
        figment = figment
            .merge(Toml::file(root.join(format!("{PROJECT_FILE_STEM}.toml"))))
            .merge(Yaml::file(root.join(format!("{PROJECT_FILE_STEM}.yaml"))))
            .merge(Json::file(root.join(format!("{PROJECT_FILE_STEM}.json"))));
        if let Some(file) = file {
            let file = match file.is_absolute() {
                true => file.to_path_buf(),
                false => root.join(file),
            };
            if !file.is_file() {
                exn::bail!(ErrorKind::NotFound(file));
            }
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file)),
            };
        }
        Ok(figment)
    }

    /// Extracts and validates a configuration from any [`Figment`].
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment.extract::<Self>().or_raise(|| ErrorKind::Load)?.validate()
    }

    /// Checks that values make sense together.
    pub fn validate(self) -> Result<Self> {
        if !(1..=MAX_KEY_LENGTH).contains(&self.key_length) {
            exn::bail!(ErrorKind::Invalid(format!(
                "key_length must be between 1 and {MAX_KEY_LENGTH}, got {}",
                self.key_length
            )));
        }
        if self.target_base_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("target_base_path must not be empty".to_string()));
        }
        if self.naming == NamingMode::Plain && self.cache == CachePolicy::IfMissing {
            exn::bail!(ErrorKind::Invalid(
                "cache = \"if_missing\" requires naming = \"keyed\"; plain names are shared between subsets".to_string()
            ));
        }
        Ok(self)
    }

    pub fn with_target_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_base_path = path.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = key_length;
        self
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }
}

/// Location of the per-user configuration file, if the platform has a
/// config directory.
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glyphcut").map(|dirs| dirs.config_dir().join("config.toml"))
}
