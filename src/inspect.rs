//! Page-level inspection.
//!
//! [`inspect_page`] applies the decoders of [`heap`](crate::heap) to one page
//! image and collects one outcome per line pointer. Errors in the page
//! header or line pointer array end the page; errors inside a tuple only
//! mark that slot as failed.
//!
//! [`Inspector`] adds a [`PageSource`] in front of it.

mod error;

pub use error::InspectError;

use std::collections::VecDeque;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::heap::{DecodeError, DecodedRecord, HeapPage, LinePointer, PageHeader, TupleHeader};
use crate::storage::{PAGE_SIZE, PageId, PageSource};

/// What decoding one line pointer produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    /// Unused, Redirect or Dead: nothing to decode.
    Skipped,
    /// The span or the tuple header could not be decoded.
    Failed(DecodeError),
    /// The tuple header was decoded.
    Tuple {
        header: TupleHeader,
        /// Demo row, `None` when row decoding is turned off.
        row: Option<Result<DecodedRecord, DecodeError>>,
    },
}

/// A line pointer and the outcome of decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotReport {
    pub line_pointer: LinePointer,
    pub outcome: SlotOutcome,
}

/// Everything decoded from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInspection {
    pub page_id: PageId,
    pub header: PageHeader,
    pub slots: Vec<SlotReport>,
}

impl PageInspection {
    /// Demo rows that decoded successfully, with their slot numbers.
    pub fn rows(&self) -> impl Iterator<Item = (u16, &DecodedRecord)> {
        self.slots.iter().filter_map(|slot| match &slot.outcome {
            SlotOutcome::Tuple {
                row: Some(Ok(row)), ..
            } => Some((slot.line_pointer.index, row)),
            _ => None,
        })
    }

    /// Number of slots whose tuple or row failed to decode.
    pub fn failed_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| {
                matches!(
                    slot.outcome,
                    SlotOutcome::Failed(_) | SlotOutcome::Tuple { row: Some(Err(_)), .. }
                )
            })
            .count()
    }
}

/// Decodes one page image.
///
/// When `decode_rows` is set, each tuple is also decoded as a demo row
/// `(id BIGINT, name TEXT)`.
///
/// # Errors
///
/// Returns the page-fatal errors of [`HeapPage::parse`].
pub fn inspect_page(
    page_id: PageId,
    data: &[u8],
    decode_rows: bool,
) -> Result<PageInspection, DecodeError> {
    let page = HeapPage::parse(data)?;

    let slots = page
        .line_pointers()
        .iter()
        .map(|lp| SlotReport {
            line_pointer: *lp,
            outcome: inspect_slot(&page, lp, decode_rows),
        })
        .collect();

    Ok(PageInspection {
        page_id,
        header: *page.header(),
        slots,
    })
}

fn inspect_slot(page: &HeapPage<'_>, lp: &LinePointer, decode_rows: bool) -> SlotOutcome {
    let tuple = match page.tuple_data(lp) {
        None => return SlotOutcome::Skipped,
        Some(Ok(tuple)) => tuple,
        Some(Err(err)) => {
            warn!("slot {}: {}", lp.index, err);
            return SlotOutcome::Failed(err);
        }
    };

    let header = match TupleHeader::read(tuple) {
        Ok(header) => header,
        Err(err) => {
            warn!("slot {}: {}", lp.index, err);
            return SlotOutcome::Failed(err);
        }
    };

    let row = decode_rows.then(|| {
        DecodedRecord::decode(tuple, &header)
            .inspect_err(|err| warn!("slot {}: {}", lp.index, err))
    });
    SlotOutcome::Tuple { header, row }
}

/// Pages decoded at once by [`Inspector::inspect_all`] unless configured.
pub const DEFAULT_CONCURRENCY: usize = 8;

type DecodeTask = JoinHandle<Result<PageInspection, InspectError>>;

/// Reads pages from a [`PageSource`] and inspects them.
pub struct Inspector<S> {
    source: S,
    decode_rows: bool,
    concurrency: usize,
}

impl<S: PageSource> Inspector<S> {
    /// Creates an inspector that decodes demo rows.
    pub fn new(source: S) -> Self {
        Self {
            source,
            decode_rows: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_decode_rows(mut self, decode_rows: bool) -> Self {
        self.decode_rows = decode_rows;
        self
    }

    /// Caps how many pages `inspect_all` holds and decodes at once (at
    /// least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reads and inspects a single page.
    pub async fn inspect(&self, page_id: PageId) -> Result<PageInspection, InspectError> {
        let mut buf = vec![0u8; PAGE_SIZE];
        self.source.read_page(page_id, &mut buf).await?;
        debug!("inspecting page {}", page_id);
        inspect_page(page_id, &buf, self.decode_rows)
            .map_err(|source| InspectError::Page { page_id, source })
    }

    /// Inspects every page of the source.
    ///
    /// Pages are read in order and decoded on blocking tasks, with at most
    /// `concurrency` pages in flight. Results come back in page order; a
    /// failed page does not stop the others.
    pub async fn inspect_all(&self) -> Vec<Result<PageInspection, InspectError>> {
        let count = self.source.page_count().await;
        let mut results = Vec::with_capacity(count as usize);
        let mut in_flight = VecDeque::with_capacity(self.concurrency);

        for n in 0..count {
            while in_flight.len() >= self.concurrency {
                let Some(task) = in_flight.pop_front() else {
                    break;
                };
                results.push(join_decode(task).await);
            }
            in_flight.push_back(self.spawn_decode(PageId::new(n)).await);
        }
        for task in in_flight {
            results.push(join_decode(task).await);
        }
        results
    }

    async fn spawn_decode(&self, page_id: PageId) -> Result<DecodeTask, InspectError> {
        let mut buf = vec![0u8; PAGE_SIZE];
        self.source.read_page(page_id, &mut buf).await?;
        let decode_rows = self.decode_rows;
        Ok(tokio::task::spawn_blocking(move || {
            inspect_page(page_id, &buf, decode_rows)
                .map_err(|source| InspectError::Page { page_id, source })
        }))
    }
}

async fn join_decode(
    task: Result<DecodeTask, InspectError>,
) -> Result<PageInspection, InspectError> {
    task?.await?
}
