//! Error types

use std::path::PathBuf;

/// Errors raised by a [`DataView`](crate::data::data_view::DataView).
///
/// Every variant is a configuration error: the operation is rejected and
/// the view state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// Strict mode: the operation named a column the loaded dataset lacks.
    #[error("configuration error: {operation} references unknown column '{column}'")]
    UnknownColumn {
        operation: &'static str,
        column: String,
    },

    /// Page size text that is neither a positive integer nor `all`.
    #[error("configuration error: invalid page size '{0}'")]
    InvalidPageSize(String),
}

/// Errors from the collaborators that list and parse report files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Report path does not exist or is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Access denied: {0} is outside of the report base directory")]
    OutsideBase(PathBuf),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
