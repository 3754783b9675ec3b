use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::ProcessError;

/// Identity of a source stylesheet: an absolute path, cheap to clone and hash.
///
/// A relative path is a programmer/integration error, not user input, so
/// construction is the one fatal precondition in the whole crate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FileKey(Arc<Path>);

impl FileKey {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ProcessError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(ProcessError::NotAbsolute(path.to_path_buf()));
        }
        Ok(Self(Arc::from(path)))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory containing the file, used to resolve relative import requests.
    pub fn dir(&self) -> &Path {
        self.0.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// File stem with the `.st` sub-extension stripped (`button.st.css` -> `button`).
    pub fn basename_seed(&self) -> String {
        let stem = self
            .0
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("stylesheet");
        let stem = stem.strip_suffix(".st").unwrap_or(stem);
        let mut seed: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        if seed.chars().next().is_none_or(|c| c.is_ascii_digit()) {
            seed.insert(0, 's');
        }
        seed
    }

    /// Resolve an import request against this file's directory.
    pub fn join_request(&self, request: &str) -> PathBuf {
        let joined = self.dir().join(request);
        normalize(&joined)
    }
}

/// Lexical `.`/`..` normalization, no filesystem access.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileKey({})", self.0.display())
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
