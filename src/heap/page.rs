//! Page header and the read-only heap page view.
//!
//! ```text
//! +------------------+ offset 0
//! | PageHeader (24B) |
//! +------------------+ offset 24
//! | Line pointers    | (grow toward pd_lower)
//! +------------------+ pd_lower
//! | Free space       |
//! +------------------+ pd_upper
//! | Tuples           | (grow downward from pd_special)
//! +------------------+ pd_special
//! | Special space    | (empty for heap pages)
//! +------------------+ offset 8192
//! ```

use bytes::Buf;
use log::{debug, trace};

use super::error::{DecodeError, ensure_len};
use super::line_pointer::{LinePointer, read_line_pointers};
use super::record::Record;
use super::schema::Schema;
use super::tuple_header::TupleHeader;
use crate::storage::PAGE_SIZE;

/// Size of the page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 24;

/// Page header stored at the beginning of each page.
///
/// Layout (24 bytes, little-endian):
/// - `lsn_hi`: u32 - high half of the LSN (`xlogid`)
/// - `lsn_lo`: u32 - low half of the LSN (`xrecoff`)
/// - `checksum`: u16
/// - `flags`: u16
/// - `lower`: u16 - end of the line pointer array
/// - `upper`: u16 - start of tuple data
/// - `special`: u16 - start of the special space
/// - `pagesize_version`: u16 - page size (high byte) | layout version (low byte)
/// - `prune_xid`: u32 - oldest prunable XID, or 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub lsn_hi: u32,
    pub lsn_lo: u32,
    pub checksum: u16,
    pub flags: u16,
    pub lower: u16,
    pub upper: u16,
    pub special: u16,
    pub pagesize_version: u16,
    pub prune_xid: u32,
}

impl PageHeader {
    /// There are unused line pointers before `pd_lower`.
    pub const HAS_FREE_LINES: u16 = 0x0001;
    /// Not enough free space for a new tuple.
    pub const PAGE_FULL: u16 = 0x0002;
    /// All tuples on the page are visible to everyone.
    pub const ALL_VISIBLE: u16 = 0x0004;

    /// Reads a header from the first 24 bytes of a page.
    ///
    /// No field is validated here; see [`check_geometry`](Self::check_geometry).
    pub fn read_from(data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len!(data, PAGE_HEADER_SIZE, "page header");
        let mut buf = &data[..PAGE_HEADER_SIZE];
        Ok(Self {
            lsn_hi: buf.get_u32_le(),
            lsn_lo: buf.get_u32_le(),
            checksum: buf.get_u16_le(),
            flags: buf.get_u16_le(),
            lower: buf.get_u16_le(),
            upper: buf.get_u16_le(),
            special: buf.get_u16_le(),
            pagesize_version: buf.get_u16_le(),
            prune_xid: buf.get_u32_le(),
        })
    }

    /// Returns the full 64-bit LSN.
    pub fn lsn(&self) -> u64 {
        ((self.lsn_hi as u64) << 32) | self.lsn_lo as u64
    }

    /// Page size recorded in the header.
    pub fn page_size(&self) -> usize {
        (self.pagesize_version & 0xFF00) as usize
    }

    /// Page layout version recorded in the header.
    pub fn layout_version(&self) -> u8 {
        (self.pagesize_version & 0x00FF) as u8
    }

    /// Bytes between the line pointer array and the tuple area.
    pub fn free_space(&self) -> u16 {
        self.upper.saturating_sub(self.lower)
    }

    pub fn has_free_lines(&self) -> bool {
        self.flags & Self::HAS_FREE_LINES != 0
    }

    pub fn is_full(&self) -> bool {
        self.flags & Self::PAGE_FULL != 0
    }

    pub fn all_visible(&self) -> bool {
        self.flags & Self::ALL_VISIBLE != 0
    }

    /// Number of line pointers implied by `pd_lower`.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::MalformedHeader` if `pd_lower` lies inside the
    /// header or implies more line pointers than a page can hold.
    pub fn slot_count(&self) -> Result<usize, DecodeError> {
        let lower = self.lower as usize;
        if lower < PAGE_HEADER_SIZE {
            return Err(DecodeError::MalformedHeader(format!(
                "pd_lower={} is inside the page header",
                self.lower
            )));
        }

        let count = (lower - PAGE_HEADER_SIZE) / super::LINE_POINTER_SIZE;
        if count > super::MAX_LINE_POINTERS {
            return Err(DecodeError::MalformedHeader(format!(
                "pd_lower={} implies {} line pointers, at most {} fit",
                self.lower,
                count,
                super::MAX_LINE_POINTERS
            )));
        }
        Ok(count)
    }

    /// Checks that `pd_lower` lies past the header and that `pd_lower`,
    /// `pd_upper` and `pd_special` all lie within a page of `page_len` bytes.
    ///
    /// Their relative order is not checked: a Normal line pointer outside
    /// `[pd_upper, pd_special)` fails on its own in
    /// [`LinePointer::check_bounds`].
    pub fn check_geometry(&self, page_len: usize) -> Result<(), DecodeError> {
        let (lower, upper, special) = (
            self.lower as usize,
            self.upper as usize,
            self.special as usize,
        );
        if lower < PAGE_HEADER_SIZE
            || lower > PAGE_SIZE
            || upper > PAGE_SIZE
            || special > PAGE_SIZE
        {
            return Err(DecodeError::MalformedHeader(format!(
                "pd_lower={} pd_upper={} pd_special={} outside page of {} bytes",
                lower, upper, special, PAGE_SIZE
            )));
        }
        if special > page_len {
            return Err(DecodeError::TruncatedInput {
                what: "page",
                required: special,
                available: page_len,
            });
        }
        Ok(())
    }
}

/// A decoded heap page.
///
/// Parsing decodes the header and the line pointer array up front; tuples
/// are decoded on demand, one slot at a time, so a damaged tuple never
/// prevents reading its neighbours.
///
/// # Example
///
/// ```no_run
/// use heapinspect::heap::{HeapPage, Schema};
///
/// # fn load() -> Vec<u8> { vec![0u8; 8192] }
/// let data = load();
/// let page = HeapPage::parse(&data)?;
/// for lp in page.line_pointers() {
///     if let Some(record) = page.decode_record(lp, &Schema::demo()) {
///         println!("{}: {:?}", lp.index, record);
///     }
/// }
/// # Ok::<(), heapinspect::heap::DecodeError>(())
/// ```
#[derive(Debug)]
pub struct HeapPage<'a> {
    data: &'a [u8],
    header: PageHeader,
    line_pointers: Vec<LinePointer>,
}

impl<'a> HeapPage<'a> {
    /// Decodes the page header and line pointer array.
    ///
    /// # Errors
    ///
    /// Any error here is fatal for the page: `TruncatedInput` if the buffer
    /// cannot hold the header or slot array, `MalformedHeader` if the slot
    /// count or a header offset falls outside the page.
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        let header = PageHeader::read_from(data)?;
        debug!(
            "page header: lower={} upper={} special={} lsn={:X}",
            header.lower,
            header.upper,
            header.special,
            header.lsn()
        );

        let line_pointers = read_line_pointers(data, &header)?;
        header.check_geometry(data.len())?;
        trace!("{} line pointers", line_pointers.len());

        Ok(Self {
            data,
            header,
            line_pointers,
        })
    }

    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Line pointers in slot order (index 1 first).
    pub fn line_pointers(&self) -> &[LinePointer] {
        &self.line_pointers
    }

    /// Returns the line pointer with the given 1-based index.
    pub fn line_pointer(&self, index: u16) -> Option<&LinePointer> {
        let pos = (index as usize).checked_sub(1)?;
        self.line_pointers.get(pos)
    }

    /// Returns the bytes of the tuple a line pointer refers to.
    ///
    /// Returns `None` for Unused, Redirect and Dead line pointers, which
    /// carry no tuple. For Normal ones the span is bounds-checked first.
    pub fn tuple_data(&self, lp: &LinePointer) -> Option<Result<&'a [u8], DecodeError>> {
        if !lp.is_normal() {
            return None;
        }
        let data = self.data;
        Some(lp.check_bounds(&self.header).map(|()| &data[lp.span()]))
    }

    /// Decodes the tuple header of a Normal line pointer.
    pub fn tuple_header(&self, lp: &LinePointer) -> Option<Result<TupleHeader, DecodeError>> {
        self.tuple_data(lp)
            .map(|tuple| tuple.and_then(TupleHeader::read))
    }

    /// Decodes the attributes of a Normal line pointer's tuple.
    pub fn decode_record(
        &self,
        lp: &LinePointer,
        schema: &Schema,
    ) -> Option<Result<Record, DecodeError>> {
        self.tuple_data(lp).map(|tuple| {
            let tuple = tuple?;
            let header = TupleHeader::read(tuple)?;
            Record::decode(tuple, &header, schema)
        })
    }
}
