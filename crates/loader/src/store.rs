//! Artifact storage on the local filesystem.
//!
//! Artifacts live flat in a single output directory and are addressed by
//! file name only, accessed via `tokio::fs`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// The output directory artifacts are written to.
///
/// # Examples
///
/// ```no_run
/// use glyphcut_loader::ArtifactStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ArtifactStore::new("/path/to/project/src/.font-subsets")?;
/// store.ensure_root().await?;
/// store.write("reduced_font.woff2", b"...").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}
impl ArtifactStore {
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is not
    /// absolute.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        Ok(Self { root: normalize(root) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the output directory and any missing parents. Safe to call
    /// on every request.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.or_raise(|| ErrorKind::Write(self.root.clone()))
    }

    /// Absolute path of the artifact called `file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) unless `file_name` is
    /// exactly one normal path component.
    pub fn absolute_path(&self, file_name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_file_name(file_name)?))
    }

    pub async fn exists(&self, file_name: &str) -> Result<bool> {
        let path = self.absolute_path(file_name)?;
        fs::try_exists(&path).await.or_raise(|| ErrorKind::Write(path))
    }

    /// Writes an artifact, replacing any previous content. Returns the
    /// artifact's absolute path.
    pub async fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.absolute_path(file_name)?;
        fs::write(&path, data).await.or_raise(|| ErrorKind::Write(path.clone()))?;
        Ok(path)
    }
}

/// Accepts a bare file name: no separators, no `.` or `..`, no null bytes.
fn validate_file_name(file_name: &str) -> Result<&str> {
    let invalid = || ErrorKind::InvalidPath(PathBuf::from(file_name));
    // Backslashes are separators on Windows; reject them everywhere so the
    // same file names work on every platform.
    if file_name.contains(['/', '\\', '\0']) {
        exn::bail!(invalid());
    }
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(file_name),
        _ => exn::bail!(invalid()),
    }
}

/// Lexically resolves `.` and `..` components without touching the
/// filesystem. `..` never climbs above the root.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if !matches!(normalized.components().next_back(), None | Some(Component::RootDir | Component::Prefix(_)))
                {
                    normalized.pop();
                }
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
