//! Global error handling for srcbundle
//!
//! This module provides a centralized error type for every stage of the
//! bundling pipeline. Per-file problems (undecodable text, failed copies) are
//! not errors at this level: they are carried as [`crate::types::SoftFailure`]
//! values and never escape the step that produced them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for srcbundle operations
#[derive(Error, Debug)]
pub enum BundleError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Settings file parse/serialize errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive writer errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The scan root does not exist or is not a directory
    #[error("Scan folder not found: {}", .0.display())]
    ScanRootMissing(PathBuf),

    /// Archive step errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for srcbundle operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Creates a BundleError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::BundleError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Wrap the error into [`BundleError::Archive`] with a context prefix
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            BundleError::Archive(format!("{}: {}", context, e))
        })
    }
}

// Allows `?` on library results inside io::Result test helpers
impl From<BundleError> for io::Error {
    fn from(err: BundleError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
