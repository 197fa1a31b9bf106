// Serve root module
// Validates the served directory once at startup

use std::path::{Path, PathBuf};

use crate::error::ServerError;

/// Absolute, canonical directory that all requests are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeRoot {
    path: PathBuf,
}

impl ServeRoot {
    /// Resolve `dir` against the working directory and check it is a directory.
    ///
    /// The returned path is canonical (symlinks resolved), so containment
    /// checks can compare canonical request targets against it directly.
    pub fn resolve(dir: impl AsRef<Path>) -> Result<Self, ServerError> {
        let absolute = std::path::absolute(dir.as_ref())?;
        if !absolute.is_dir() {
            return Err(ServerError::InvalidDirectory(absolute));
        }
        let path = absolute.canonicalize()?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an already canonicalized path lies inside the root.
    pub fn contains(&self, canonical: &Path) -> bool {
        canonical.starts_with(&self.path)
    }
}
