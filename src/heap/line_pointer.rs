//! Line pointers (`ItemIdData`): the slot array after the page header.
//!
//! Each line pointer is two little-endian u16 words. The 2-bit state is
//! split across them:
//!
//! ```text
//!  w0: [f0][ offset (15 bits)        ]   f0 = bit 15 of w0
//!  w1: [ length (15 bits)        ][f1]   f1 = bit 0 of w1
//!  state = f0 | f1 << 1
//! ```

use std::fmt;
use std::ops::Range;

use super::error::{DecodeError, ensure_len};
use super::page::{PAGE_HEADER_SIZE, PageHeader};
use crate::storage::PAGE_SIZE;

/// Size of each line pointer in bytes.
pub const LINE_POINTER_SIZE: usize = 4;

/// Most line pointers a page can hold.
pub const MAX_LINE_POINTERS: usize = (PAGE_SIZE - PAGE_HEADER_SIZE) / LINE_POINTER_SIZE;

/// Line pointer state (`lp_flags`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpState {
    /// Free for reuse; length is always zero.
    Unused = 0,
    /// Points at a stored tuple.
    Normal = 1,
    /// HOT redirect; the offset holds another slot number.
    Redirect = 2,
    /// Dead, may or may not still have storage.
    Dead = 3,
}

impl LpState {
    /// Maps the low two bits of `bits` to a state.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => LpState::Unused,
            1 => LpState::Normal,
            2 => LpState::Redirect,
            _ => LpState::Dead,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpState::Unused => "UNUSED",
            LpState::Normal => "NORMAL",
            LpState::Redirect => "REDIRECT",
            LpState::Dead => "DEAD",
        }
    }
}

impl fmt::Display for LpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded line pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePointer {
    /// 1-based slot number (PostgreSQL's `OffsetNumber`).
    pub index: u16,
    /// Byte offset of the tuple from the start of the page.
    pub offset: u16,
    /// Tuple length in bytes.
    pub length: u16,
    pub state: LpState,
}

impl LinePointer {
    /// Unpacks a line pointer from its two on-disk words.
    pub const fn from_words(index: u16, w0: u16, w1: u16) -> Self {
        let flags = ((w0 >> 15) & 0x01) | ((w1 << 1) & 0x02);
        Self {
            index,
            offset: w0 & 0x7FFF,
            length: w1 >> 1,
            state: LpState::from_bits(flags as u8),
        }
    }

    /// Reads a line pointer from the first 4 bytes of `data`.
    pub fn read_from(index: u16, data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len!(data, LINE_POINTER_SIZE, "line pointer");
        Ok(Self::from_words(
            index,
            u16::from_le_bytes([data[0], data[1]]),
            u16::from_le_bytes([data[2], data[3]]),
        ))
    }

    /// Raw 2-bit `lp_flags` value.
    pub fn flags(&self) -> u8 {
        self.state as u8
    }

    pub fn is_normal(&self) -> bool {
        self.state == LpState::Normal
    }

    /// Byte range of the tuple within the page.
    pub fn span(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }

    /// Checks that a Normal line pointer's span lies in the tuple area
    /// `[pd_upper, pd_special)`. Other states carry no span and always pass.
    pub fn check_bounds(&self, header: &PageHeader) -> Result<(), DecodeError> {
        if !self.is_normal() {
            return Ok(());
        }

        let span = self.span();
        if span.start == 0
            || span.start < header.upper as usize
            || span.end > header.special as usize
        {
            return Err(DecodeError::SpanOutOfBounds {
                index: self.index,
                offset: self.offset,
                length: self.length,
                upper: header.upper,
                special: header.special,
            });
        }
        Ok(())
    }
}

/// Decodes the line pointer array that follows the page header.
///
/// # Errors
///
/// Returns `DecodeError::MalformedHeader` if `pd_lower` implies an impossible
/// slot count, `DecodeError::TruncatedInput` if `data` ends inside the array.
pub fn read_line_pointers(
    data: &[u8],
    header: &PageHeader,
) -> Result<Vec<LinePointer>, DecodeError> {
    let count = header.slot_count()?;
    ensure_len!(
        data,
        PAGE_HEADER_SIZE + count * LINE_POINTER_SIZE,
        "line pointer array"
    );

    let array = &data[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + count * LINE_POINTER_SIZE];
    array
        .chunks_exact(LINE_POINTER_SIZE)
        .enumerate()
        .map(|(i, raw)| LinePointer::read_from(i as u16 + 1, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn header(lower: u16, upper: u16, special: u16) -> PageHeader {
        PageHeader {
            lsn_hi: 0,
            lsn_lo: 0,
            checksum: 0,
            flags: 0,
            lower,
            upper,
            special,
            pagesize_version: 0x2004,
            prune_xid: 0,
        }
    }

    fn normal(offset: u16, length: u16) -> LinePointer {
        LinePointer {
            index: 1,
            offset,
            length,
            state: LpState::Normal,
        }
    }

    proptest! {
        #[test]
        fn test_unpack_full_domain(w0 in any::<u16>(), w1 in any::<u16>()) {
            let lp = LinePointer::from_words(7, w0, w1);
            prop_assert_eq!(lp.offset, w0 & 0x7FFF);
            prop_assert_eq!(lp.length, w1 >> 1);
            prop_assert_eq!(lp.flags() as u16, ((w0 >> 15) & 1) | ((w1 << 1) & 2));
            prop_assert_eq!(lp.index, 7);
        }
    }

    #[test]
    fn test_states() {
        assert_eq!(LinePointer::from_words(1, 0x0000, 0x0000).state, LpState::Unused);
        assert_eq!(LinePointer::from_words(1, 0x8000, 0x0000).state, LpState::Normal);
        assert_eq!(LinePointer::from_words(1, 0x0000, 0x0001).state, LpState::Redirect);
        assert_eq!(LinePointer::from_words(1, 0x8000, 0x0001).state, LpState::Dead);
    }

    #[test]
    fn test_read_from() {
        // offset 8100, length 35, Normal
        let w0 = 8100u16 | 0x8000;
        let w1 = 35u16 << 1;
        let mut raw = Vec::new();
        raw.extend_from_slice(&w0.to_le_bytes());
        raw.extend_from_slice(&w1.to_le_bytes());

        let lp = LinePointer::read_from(3, &raw).unwrap();
        assert_eq!(
            lp,
            LinePointer {
                index: 3,
                offset: 8100,
                length: 35,
                state: LpState::Normal
            }
        );
        assert_eq!(lp.span(), 8100..8135);
        assert_eq!(lp.state.to_string(), "NORMAL");
        assert!(LinePointer::read_from(3, &raw[..3]).is_err());
    }

    #[test]
    fn test_check_bounds() {
        let h = header(28, 8100, 8192);
        assert_eq!(normal(8100, 92).check_bounds(&h), Ok(()));
        assert!(matches!(
            normal(8100, 93).check_bounds(&h),
            Err(DecodeError::SpanOutOfBounds { index: 1, offset: 8100, length: 93, .. })
        ));
        // Below pd_upper
        assert!(normal(8000, 20).check_bounds(&h).is_err());
        // Zero offset
        assert!(normal(0, 20).check_bounds(&header(24, 0, 8192)).is_err());
    }

    #[test]
    fn test_check_bounds_ignores_non_normal() {
        let h = header(28, 8100, 8192);
        for state in [LpState::Unused, LpState::Redirect, LpState::Dead] {
            let lp = LinePointer { index: 1, offset: 9000, length: 500, state };
            assert_eq!(lp.check_bounds(&h), Ok(()));
        }
    }

    #[test]
    fn test_read_line_pointers() {
        let mut page = vec![0u8; PAGE_SIZE];
        page[24..26].copy_from_slice(&(8150u16 | 0x8000).to_le_bytes());
        page[26..28].copy_from_slice(&(42u16 << 1).to_le_bytes());
        page[28..30].copy_from_slice(&2u16.to_le_bytes());
        page[30..32].copy_from_slice(&1u16.to_le_bytes());

        let lps = read_line_pointers(&page, &header(32, 8150, 8192)).unwrap();
        assert_eq!(lps.len(), 2);
        assert_eq!(
            lps[0],
            LinePointer {
                index: 1,
                offset: 8150,
                length: 42,
                state: LpState::Normal
            }
        );
        assert_eq!(
            lps[1],
            LinePointer {
                index: 2,
                offset: 2,
                length: 0,
                state: LpState::Redirect
            }
        );
    }

    #[test]
    fn test_read_line_pointers_truncated() {
        let page = vec![0u8; 30];
        assert_eq!(
            read_line_pointers(&page, &header(40, 8192, 8192)),
            Err(DecodeError::TruncatedInput {
                what: "line pointer array",
                required: 40,
                available: 30
            })
        );
    }

    #[test]
    fn test_max_line_pointers() {
        assert_eq!(MAX_LINE_POINTERS, 2042);
        let lower = (PAGE_HEADER_SIZE + MAX_LINE_POINTERS * LINE_POINTER_SIZE) as u16;
        let page = vec![0u8; PAGE_SIZE];
        assert_eq!(read_line_pointers(&page, &header(lower, 8192, 8192)).unwrap().len(), 2042);
    }
}
