//! Session layer: file loading, the caching meta provider, and the
//! convenience [`Project`] facade tying loader + processor + modules
//! together.

mod file_loader;
mod file_processor;
#[allow(clippy::module_inception)]
mod project;

pub use file_loader::{DiskLoader, FileLoader, MemoryLoader};
pub use file_processor::FileProcessor;
pub use project::Project;
