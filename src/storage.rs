//! Page sources for the inspector.
//!
//! The storage layer hands out raw 8KB page images. It never interprets page
//! contents; decoding is the job of the [`heap`](crate::heap) module.
//!
//! ```text
//! +-------------------+
//! | Inspector         |
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | PageSource trait  |  <- io
//! +-------------------+
//!       /      \
//!      v        v
//! +--------------+ +------------+
//! | MemorySource | | FileSource |
//! +--------------+ +------------+
//! ```

pub mod error;
pub mod io;
pub mod page;

pub use error::StorageError;
pub use io::{FileSource, MemorySource, PageSource};
pub use page::{PAGE_SIZE, PageId};
