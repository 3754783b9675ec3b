//! The caching meta provider.
//!
//! Builds each file's [`Meta`] at most once per content and hands out
//! `Arc<Meta>` snapshots. A per-thread "currently building" marker turns
//! provider re-entrancy (a build that somehow requests itself) into
//! [`ProcessError::ReentrantBuild`] instead of a deadlock; ordinary mutual
//! imports never trip it because imports resolve lazily at transform time,
//! and concurrent builds of the same file on different threads race
//! benignly (the first cache insert wins).

use std::path::Path;
use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::base::{FileKey, ProcessError};
use crate::semantic::processor::{ProcessorOptions, process};
use crate::semantic::resolver::MetaProvider;
use crate::semantic::Meta;

use super::file_loader::FileLoader;

pub struct FileProcessor {
    loader: Box<dyn FileLoader>,
    options: ProcessorOptions,
    cache: Mutex<FxHashMap<FileKey, Arc<Meta>>>,
    building: Mutex<FxHashSet<(ThreadId, FileKey)>>,
}

impl FileProcessor {
    pub fn new(loader: Box<dyn FileLoader>, options: ProcessorOptions) -> Self {
        Self {
            loader,
            options,
            cache: Mutex::new(FxHashMap::default()),
            building: Mutex::new(FxHashSet::default()),
        }
    }

    /// Build-or-fetch the meta for an absolute path.
    pub fn process(&self, path: impl AsRef<Path>) -> Result<Arc<Meta>, ProcessError> {
        let key = FileKey::new(path)?;
        if let Some(meta) = self.cache.lock().get(&key) {
            return Ok(meta.clone());
        }

        // re-entrancy is per thread: another thread building the same file
        // is a benign race, not a cycle
        let thread = std::thread::current().id();
        {
            let mut building = self.building.lock();
            if !building.insert((thread, key.clone())) {
                return Err(ProcessError::ReentrantBuild(key.as_path().to_path_buf()));
            }
        }
        let result = self.build(&key);
        self.building.lock().remove(&(thread, key));
        result
    }

    fn build(&self, key: &FileKey) -> Result<Arc<Meta>, ProcessError> {
        let Some(css) = self.loader.load(key.as_path()) else {
            return Err(ProcessError::Unreadable(key.as_path().to_path_buf()));
        };
        debug!(source = %key, "building meta");
        let meta = Arc::new(process(key.clone(), &css, &self.options));
        let mut cache = self.cache.lock();
        // a concurrent build may have won; keep the first
        Ok(cache.entry(key.clone()).or_insert(meta).clone())
    }

    /// Drop a cached meta (the source content changed).
    pub fn invalidate(&self, path: &Path) {
        if let Ok(key) = FileKey::new(path) {
            self.cache.lock().remove(&key);
        }
    }

    /// Number of cached metas.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

impl MetaProvider for FileProcessor {
    fn meta_for(&self, key: &FileKey) -> Option<Arc<Meta>> {
        self.process(key.as_path()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::file_loader::{FileLoader, MemoryLoader};

    fn processor_with(files: &[(&str, &str)]) -> FileProcessor {
        let loader = MemoryLoader::new();
        for (path, css) in files {
            loader.insert(*path, *css);
        }
        FileProcessor::new(Box::new(loader), ProcessorOptions::seed_only())
    }

    #[test]
    fn test_process_caches_by_identity() {
        let processor = processor_with(&[("/p/a.st.css", ".a {}")]);
        let first = processor.process("/p/a.st.css").unwrap();
        let second = processor.process("/p/a.st.css").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(processor.cached(), 1);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let processor = processor_with(&[]);
        assert!(matches!(
            processor.process("/p/ghost.st.css"),
            Err(ProcessError::Unreadable(_))
        ));
    }

    #[test]
    fn test_relative_path_rejected() {
        let processor = processor_with(&[]);
        assert!(matches!(
            processor.process("ghost.st.css"),
            Err(ProcessError::NotAbsolute(_))
        ));
    }

    #[test]
    fn test_concurrent_builds_of_same_file_all_succeed() {
        struct SlowLoader(MemoryLoader);
        impl FileLoader for SlowLoader {
            fn load(&self, path: &Path) -> Option<String> {
                std::thread::sleep(std::time::Duration::from_millis(25));
                self.0.load(path)
            }
        }

        let loader = MemoryLoader::new();
        loader.insert("/p/dep.st.css", ".d {}");
        let processor = Arc::new(FileProcessor::new(
            Box::new(SlowLoader(loader)),
            ProcessorOptions::seed_only(),
        ));

        let barrier = Arc::new(std::sync::Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let processor = processor.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    processor.process("/p/dep.st.css")
                })
            })
            .collect();

        let metas: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        assert!(metas.iter().all(|meta| Arc::ptr_eq(meta, &metas[0])));
        assert_eq!(processor.cached(), 1);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let loader = MemoryLoader::new();
        loader.insert("/p/a.st.css", ".a {}");
        let processor = FileProcessor::new(Box::new(loader.clone()), ProcessorOptions::seed_only());

        let first = processor.process("/p/a.st.css").unwrap();
        loader.insert("/p/a.st.css", ".a {} .b {}");
        processor.invalidate(Path::new("/p/a.st.css"));
        let second = processor.process("/p/a.st.css").unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.classes.contains("b"));
    }
}
