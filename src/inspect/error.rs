//! Inspection errors.

use thiserror::Error;

use crate::heap::DecodeError;
use crate::storage::{PageId, StorageError};

/// Errors that stop the inspection of a page.
///
/// Slot-scoped decode failures are not errors at this level; they are
/// reported inside [`SlotOutcome`](super::SlotOutcome).
#[derive(Debug, Error)]
pub enum InspectError {
    /// The page could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The page header or line pointer array could not be decoded.
    #[error("page {page_id}: {source}")]
    Page {
        page_id: PageId,
        #[source]
        source: DecodeError,
    },

    /// A decode task panicked or was cancelled.
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
