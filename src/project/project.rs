//! A compilation session: loader + processor cache + module resolver.
//!
//! Multiple independent sessions can coexist in one process; nothing here is
//! a singleton. Whole-project transforms fan out with rayon, which is safe
//! because metas are immutable snapshots and the cache builds each file at
//! most once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::base::ProcessError;
use crate::semantic::processor::ProcessorOptions;
use crate::semantic::transformer::{StylesheetTransformer, TransformOutput};
use crate::semantic::{Meta, ModuleResolver, NullModuleResolver};

use super::file_loader::{DiskLoader, FileLoader, MemoryLoader};
use super::file_processor::FileProcessor;

pub struct Project {
    processor: FileProcessor,
    modules: Box<dyn ModuleResolver>,
    overlay: Option<MemoryLoader>,
}

impl Project {
    pub fn new(
        loader: Box<dyn FileLoader>,
        options: ProcessorOptions,
        modules: Box<dyn ModuleResolver>,
    ) -> Self {
        Self {
            processor: FileProcessor::new(loader, options),
            modules,
            overlay: None,
        }
    }

    /// A session reading from the filesystem with default namespacing.
    pub fn on_disk() -> Self {
        Self::new(
            Box::new(DiskLoader),
            ProcessorOptions::default(),
            Box::new(NullModuleResolver),
        )
    }

    /// A fully in-memory session (tests, playgrounds). Sources are added
    /// with [`Project::add_source`].
    pub fn in_memory(options: ProcessorOptions, modules: Box<dyn ModuleResolver>) -> Self {
        let overlay = MemoryLoader::new();
        let mut project = Self::new(Box::new(overlay.clone()), options, modules);
        project.overlay = Some(overlay);
        project
    }

    /// Add (or replace) an in-memory source. Replacing drops the cached meta.
    pub fn add_source(&self, path: impl Into<PathBuf>, css: impl Into<String>) {
        let Some(overlay) = &self.overlay else {
            // disk-backed sessions have no overlay to write into
            return;
        };
        let path = path.into();
        overlay.insert(path.clone(), css);
        self.processor.invalidate(&path);
    }

    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<Arc<Meta>, ProcessError> {
        self.processor.process(path)
    }

    pub fn transform_file(&self, path: impl AsRef<Path>) -> Result<TransformOutput, ProcessError> {
        let meta = self.processor.process(path)?;
        Ok(StylesheetTransformer::new(meta, &self.processor, self.modules.as_ref()).transform())
    }

    /// Transform many files in parallel, preserving input order.
    pub fn transform_all(
        &self,
        paths: &[PathBuf],
    ) -> Vec<(PathBuf, Result<TransformOutput, ProcessError>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.transform_file(path)))
            .collect()
    }
}
