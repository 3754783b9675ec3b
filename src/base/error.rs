use std::path::PathBuf;

/// Fatal errors: integration/configuration bugs, never user stylesheet content.
///
/// Everything content-related is reported through diagnostics and processing
/// continues; see `semantic::types::Diagnostic`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessError {
    #[error("source path must be absolute: {0}")]
    NotAbsolute(PathBuf),

    #[error("no loader could read {0}")]
    Unreadable(PathBuf),

    #[error("re-entrant processing of {0} while it is already being built")]
    ReentrantBuild(PathBuf),
}
