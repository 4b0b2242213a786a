//! Attribute alignment and the tuple null bitmap.

use super::error::{DecodeError, ensure_len};
use super::tuple_header::{TUPLE_HEADER_SIZE, TupleHeader};

/// Alignment class of an attribute (`pg_type.typalign`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttAlign {
    /// `'c'`: no alignment.
    Char = 1,
    /// `'s'`: 2 bytes.
    Short = 2,
    /// `'i'`: 4 bytes.
    Int = 4,
    /// `'d'`: 8 bytes.
    Double = 8,
}

impl AttAlign {
    /// Parses a `typalign` character.
    pub fn from_typalign(c: char) -> Option<Self> {
        match c {
            'c' => Some(AttAlign::Char),
            's' => Some(AttAlign::Short),
            'i' => Some(AttAlign::Int),
            'd' => Some(AttAlign::Double),
            _ => None,
        }
    }

    pub const fn bytes(self) -> usize {
        self as usize
    }
}

/// Rounds `offset` up to the next multiple of the alignment class.
pub const fn align_offset(offset: usize, align: AttAlign) -> usize {
    let a = align.bytes();
    (offset + a - 1) & !(a - 1)
}

/// Null bitmap of a tuple (`t_bits`).
///
/// Present only when the tuple's HASNULL flag is set, in which case it
/// occupies `ceil(natts / 8)` bytes right after the fixed header. Bit `i % 8`
/// of byte `i / 8` set means attribute `i` is null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBitmap<'a> {
    bits: Option<&'a [u8]>,
}

impl<'a> NullBitmap<'a> {
    /// Bitmap size in bytes for `natts` attributes.
    pub const fn len_for(natts: usize) -> usize {
        natts.div_ceil(8)
    }

    /// A bitmap reporting every attribute as present.
    pub const fn none() -> Self {
        Self { bits: None }
    }

    /// Wraps raw bitmap bytes.
    pub const fn from_bytes(bits: &'a [u8]) -> Self {
        Self { bits: Some(bits) }
    }

    /// Locates the bitmap of a tuple.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::TruncatedInput` if HASNULL is set and the tuple
    /// ends before the bitmap does.
    pub fn read(tuple: &'a [u8], header: &TupleHeader) -> Result<Self, DecodeError> {
        if !header.infomask.has_null() {
            return Ok(Self::none());
        }

        let end = TUPLE_HEADER_SIZE + Self::len_for(header.natts());
        ensure_len!(tuple, end, "null bitmap");
        Ok(Self::from_bytes(&tuple[TUPLE_HEADER_SIZE..end]))
    }

    /// Whether the tuple carries a bitmap at all.
    pub fn is_present(&self) -> bool {
        self.bits.is_some()
    }

    /// Checks if attribute `attnum` (0-based) is null.
    pub fn is_null(&self, attnum: usize) -> bool {
        self.bits
            .and_then(|bits| bits.get(attnum / 8))
            .is_some_and(|byte| byte & (1 << (attnum % 8)) != 0)
    }
}
