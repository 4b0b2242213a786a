//! Fixed tuple header (`HeapTupleHeaderData`).
//!
//! Every tuple starts with a 23-byte header that records which transactions
//! created and deleted it, where its newer version lives (`t_ctid`), and
//! where its attribute data begins (`t_hoff`).

use std::fmt;

use bytes::Buf;

use super::error::{DecodeError, ensure_len};

/// Size of the fixed part of the tuple header in bytes.
///
/// Layout (little-endian):
/// - xmin: 4, xmax: 4, cid/xvac: 4
/// - ctid: block hi 2, block lo 2, offset 2
/// - infomask2: 2, infomask: 2, hoff: 1
pub const TUPLE_HEADER_SIZE: usize = 23;

/// `t_infomask` flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Infomask(u16);

impl Infomask {
    /// Tuple has a null bitmap.
    pub const HASNULL: u16 = 0x0001;
    /// Tuple has variable-width attributes.
    pub const HASVARWIDTH: u16 = 0x0002;
    /// Tuple has out-of-line (TOAST) attributes.
    pub const HASEXTERNAL: u16 = 0x0004;
    pub const XMIN_COMMITTED: u16 = 0x0100;
    pub const XMIN_INVALID: u16 = 0x0200;
    pub const XMAX_COMMITTED: u16 = 0x0400;
    pub const XMAX_INVALID: u16 = 0x0800;
    /// xmax is a MultiXactId.
    pub const XMAX_IS_MULTI: u16 = 0x1000;
    /// Tuple was updated (not just deleted).
    pub const UPDATED: u16 = 0x2000;
    /// Moved off by a pre-9.0 VACUUM FULL.
    pub const MOVED_OFF: u16 = 0x4000;
    /// Moved in by a pre-9.0 VACUUM FULL.
    pub const MOVED_IN: u16 = 0x8000;
    pub const MOVED: u16 = Self::MOVED_OFF | Self::MOVED_IN;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Checks if all bits of `flag` are set.
    pub const fn contains(&self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub const fn has_null(&self) -> bool {
        self.contains(Self::HASNULL)
    }

    pub const fn has_varwidth(&self) -> bool {
        self.contains(Self::HASVARWIDTH)
    }

    pub const fn has_external(&self) -> bool {
        self.contains(Self::HASEXTERNAL)
    }

    /// Either MOVED flag is set, so the third header word is `t_xvac`.
    pub const fn is_moved(&self) -> bool {
        self.0 & Self::MOVED != 0
    }
}

impl fmt::Display for Infomask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// `t_infomask2`: attribute count plus a few flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Infomask2(u16);

impl Infomask2 {
    /// Low 11 bits hold the number of attributes.
    pub const NATTS_MASK: u16 = 0x07FF;
    pub const HOT_UPDATED: u16 = 0x4000;
    pub const HEAP_ONLY: u16 = 0x8000;

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn natts(&self) -> usize {
        (self.0 & Self::NATTS_MASK) as usize
    }

    pub const fn hot_updated(&self) -> bool {
        self.0 & Self::HOT_UPDATED != 0
    }

    pub const fn heap_only(&self) -> bool {
        self.0 & Self::HEAP_ONLY != 0
    }
}

impl fmt::Display for Infomask2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Tuple identifier (`ItemPointerData`): block number split in two halves
/// plus a 1-based line pointer number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemPointer {
    pub block_hi: u16,
    pub block_lo: u16,
    pub offset: u16,
}

impl ItemPointer {
    pub const fn block(&self) -> u32 {
        ((self.block_hi as u32) << 16) | self.block_lo as u32
    }
}

impl fmt::Display for ItemPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.block(), self.offset)
    }
}

/// Decoded fixed tuple header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleHeader {
    /// Inserting transaction.
    pub xmin: u32,
    /// Deleting or locking transaction, 0 if none.
    pub xmax: u32,
    /// `t_cid` or `t_xvac`, depending on the MOVED flags.
    pub field3: u32,
    /// Current TID of this or a newer version.
    pub ctid: ItemPointer,
    pub infomask2: Infomask2,
    pub infomask: Infomask,
    /// Offset of the attribute data from the tuple start.
    pub hoff: u8,
}

impl TupleHeader {
    /// Reads the fixed header from the start of a tuple.
    ///
    /// `t_hoff` is not checked against the tuple length here; the attribute
    /// walk does that, so the header of a damaged tuple can still be shown.
    pub fn read(data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len!(data, TUPLE_HEADER_SIZE, "tuple header");
        let mut buf = &data[..TUPLE_HEADER_SIZE];
        Ok(Self {
            xmin: buf.get_u32_le(),
            xmax: buf.get_u32_le(),
            field3: buf.get_u32_le(),
            ctid: ItemPointer {
                block_hi: buf.get_u16_le(),
                block_lo: buf.get_u16_le(),
                offset: buf.get_u16_le(),
            },
            infomask2: Infomask2::from_raw(buf.get_u16_le()),
            infomask: Infomask::from_raw(buf.get_u16_le()),
            hoff: buf.get_u8(),
        })
    }

    /// Number of attributes stored in the tuple.
    pub fn natts(&self) -> usize {
        self.infomask2.natts()
    }

    /// Command id, unless the tuple was moved by an old-style VACUUM FULL.
    pub fn cid(&self) -> Option<u32> {
        (!self.infomask.is_moved()).then_some(self.field3)
    }

    /// VACUUM FULL transaction id, only set on moved tuples.
    pub fn xvac(&self) -> Option<u32> {
        self.infomask.is_moved().then_some(self.field3)
    }
}
