//! File-backed page source.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::Mutex;

use super::{PageSource, check_buffer};
use crate::storage::error::StorageError;
use crate::storage::page::{PAGE_SIZE, PageId};

/// Page source over a relation file (e.g. `base/<dboid>/<relfilenode>`).
///
/// # File Layout
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (8KB)     | Page 1 (8KB)     | Page 2 (8KB)     | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 8192      ^ offset 16384
/// ```
///
/// The file is opened read-only. A `tokio::Mutex` around the handle keeps
/// seek + read pairs atomic.
pub struct FileSource {
    path: PathBuf,
    file: Mutex<File>,
    page_count: u64,
}

impl FileSource {
    /// Opens an existing relation file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be opened.
    ///
    /// A trailing partial page is not counted; the complete pages before it
    /// stay readable.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let file = File::open(&path).await?;
        let file_size = file.metadata().await?.len();

        let page_count = file_size / PAGE_SIZE as u64;
        let tail = file_size % PAGE_SIZE as u64;
        if tail != 0 {
            warn!(
                "{}: ignoring {} bytes of partial page {}",
                path.display(),
                tail,
                page_count
            );
        }
        debug!("opened {} ({} pages)", path.display(), page_count);

        Ok(Self {
            path,
            file: Mutex::new(file),
            page_count,
        })
    }

    /// Returns the path of the relation file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSource for FileSource {
    async fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        check_buffer(buf)?;
        if page_id.page_num() >= self.page_count {
            return Err(StorageError::PageNotFound(page_id));
        }

        let mut file = self.file.lock().await;
        file.seek(std::io::SeekFrom::Start(page_id.byte_offset()))
            .await?;
        // read_exact reports a short read as UnexpectedEof
        file.read_exact(buf).await?;

        Ok(())
    }

    async fn page_count(&self) -> u64 {
        self.page_count
    }
}
