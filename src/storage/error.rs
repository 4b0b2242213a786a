//! Storage layer errors.

use thiserror::Error;

use crate::storage::PageId;

/// Errors raised while fetching page images from a [`PageSource`](super::PageSource).
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested page lies beyond the end of the source.
    #[error("page not found: {0}")]
    PageNotFound(PageId),

    /// Buffers handed to `read_page` must be exactly PAGE_SIZE bytes.
    #[error("invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize {
        /// Expected buffer size (PAGE_SIZE)
        expected: usize,
        /// Actual buffer size provided
        actual: usize,
    },

    /// I/O error from the underlying file system, including short reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
