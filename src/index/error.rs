//! Index error and result types.

use crate::infra::FsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A query or update arrived before the first build completed.
    #[error("Index not initialized")]
    NotInitialized,

    /// The workspace root itself could not be scanned.
    #[error("failed to scan workspace {root}: {source}")]
    Scan {
        root: PathBuf,
        #[source]
        source: FsError,
    },
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
