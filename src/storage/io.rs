//! Page source implementations.
//!
//! This module provides the [`PageSource`] trait for read-only page access,
//! along with [`MemorySource`] and [`FileSource`] implementations.

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

use super::page::{PAGE_SIZE, PageId};
use crate::storage::error::StorageError;

/// Read-only supplier of page images.
///
/// The decoding core never touches the file system itself; it is handed an
/// exactly-sized buffer by a `PageSource`. This keeps the decoders testable
/// against in-memory pages.
///
/// Read timeouts and retries belong to implementations (or their callers),
/// not to the decoders.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a source can be shared by the
/// tasks of an [`Inspector`](crate::inspect::Inspector).
pub trait PageSource: Send + Sync {
    /// Reads a page into caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageNotFound` if the page is beyond the source.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != PAGE_SIZE`.
    fn read_page(
        &self,
        page_id: PageId,
        buf: &mut [u8],
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Returns the number of whole pages available.
    fn page_count(&self) -> impl std::future::Future<Output = u64> + Send;
}

/// Shared argument check for `read_page` implementations.
fn check_buffer(buf: &[u8]) -> Result<(), StorageError> {
    if buf.len() != PAGE_SIZE {
        return Err(StorageError::InvalidBufferSize {
            expected: PAGE_SIZE,
            actual: buf.len(),
        });
    }
    Ok(())
}
