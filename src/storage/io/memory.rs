//! In-memory page source.

use parking_lot::RwLock;

use super::{PageSource, check_buffer};
use crate::storage::error::StorageError;
use crate::storage::page::PageId;

/// In-memory page source for tests and for pages captured elsewhere.
///
/// PageIds are assigned sequentially as Vec indices.
/// All operations are synchronous but wrapped in async for trait compatibility.
#[derive(Default)]
pub struct MemorySource {
    pages: RwLock<Vec<Box<[u8]>>>,
}

impl MemorySource {
    /// Creates a new empty in-memory source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page image and returns its PageId.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidBufferSize` if `page.len() != PAGE_SIZE`.
    pub fn push_page(&self, page: &[u8]) -> Result<PageId, StorageError> {
        check_buffer(page)?;
        let mut pages = self.pages.write();
        let page_id = PageId::new(pages.len() as u64);
        pages.push(page.into());
        Ok(page_id)
    }

    /// Builds a source from page images, numbered in iteration order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidBufferSize` for the first image that is
    /// not exactly PAGE_SIZE bytes.
    pub fn from_pages<I, P>(pages: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let source = Self::new();
        for page in pages {
            source.push_page(page.as_ref())?;
        }
        Ok(source)
    }
}

impl PageSource for MemorySource {
    async fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        check_buffer(buf)?;

        let pages = self.pages.read();
        let page = pages
            .get(page_id.page_num() as usize)
            .ok_or(StorageError::PageNotFound(page_id))?;

        buf.copy_from_slice(page);
        Ok(())
    }

    async fn page_count(&self) -> u64 {
        self.pages.read().len() as u64
    }
}
