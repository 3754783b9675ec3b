//! Foundation types for the Stylark toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`FileKey`] - Absolute-path file identity
//! - [`Position`], [`Span`] - Line/column positions for tree nodes
//! - [`ProcessError`] - The fatal (non-diagnostic) error taxonomy
//!
//! This module has NO dependencies on other stylark modules.

mod error;
mod file_key;
mod position;

pub use error::ProcessError;
pub use file_key::FileKey;
pub use position::{Position, Span};
