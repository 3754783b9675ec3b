//! Source loading seam.
//!
//! The processor cache reads stylesheet text through a [`FileLoader`] so the
//! same pipeline serves the filesystem, tests, and in-memory playgrounds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

pub trait FileLoader: Send + Sync {
    /// Stylesheet text for an absolute path, or `None` when unavailable.
    fn load(&self, path: &Path) -> Option<String>;
}

/// Reads straight from the filesystem.
#[derive(Debug, Default)]
pub struct DiskLoader;

impl FileLoader for DiskLoader {
    fn load(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

/// In-memory source overlay. Cloning shares the underlying map, so a handle
/// kept by the caller can keep adding sources after the loader is installed.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: Arc<Mutex<FxHashMap<PathBuf, String>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, css: impl Into<String>) {
        self.sources.lock().insert(path.into(), css.into());
    }

    pub fn remove(&self, path: &Path) {
        self.sources.lock().remove(path);
    }
}

impl FileLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Option<String> {
        self.sources.lock().get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader_shares_sources_across_clones() {
        let loader = MemoryLoader::new();
        let handle = loader.clone();
        handle.insert("/p/a.st.css", ".a {}");

        assert_eq!(loader.load(Path::new("/p/a.st.css")).as_deref(), Some(".a {}"));
        assert!(loader.load(Path::new("/p/missing.st.css")).is_none());

        handle.remove(Path::new("/p/a.st.css"));
        assert!(loader.load(Path::new("/p/a.st.css")).is_none());
    }

    #[test]
    fn test_disk_loader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry.st.css");
        std::fs::write(&path, ".x {}").unwrap();

        let loader = DiskLoader;
        assert_eq!(loader.load(&path).as_deref(), Some(".x {}"));
    }
}
