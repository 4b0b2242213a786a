//! Error types for heap page decoding.

use thiserror::Error;

/// Errors from decoding a heap page or one of its tuples.
///
/// Whether an error is fatal for the whole page depends on where it was
/// raised, not on its kind: a `TruncatedInput` while reading the slot array
/// ends the page, the same kind inside one tuple only fails that slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer shorter than the structure being read.
    #[error("truncated {what}: need {required} bytes, have {available}")]
    TruncatedInput {
        /// Structure being decoded.
        what: &'static str,
        /// Bytes required.
        required: usize,
        /// Bytes available.
        available: usize,
    },

    /// Header fields imply a layout outside the page.
    #[error("malformed page header: {0}")]
    MalformedHeader(String),

    /// A Normal slot's span is not inside the page's tuple area.
    #[error(
        "tuple span out of page bounds: slot {index} covers {offset}..{} but data area is {upper}..{special}",
        span_end(.offset, .length)
    )]
    SpanOutOfBounds {
        /// 1-based slot number.
        index: u16,
        /// Slot offset.
        offset: u16,
        /// Slot length.
        length: u16,
        /// `pd_upper` of the page.
        upper: u16,
        /// `pd_special` of the page.
        special: u16,
    },

    /// A varlena length below its structural minimum.
    #[error("invalid varlena: {0}")]
    InvalidEncoding(String),

    /// Compressed or out-of-line (TOAST) varlena.
    #[error("unsupported varlena: compressed or out-of-line value (header 0x{header:08x})")]
    UnsupportedEncoding {
        /// Raw 4-byte header word.
        header: u32,
    },

    /// Text attribute whose payload is not UTF-8.
    #[error("attribute {index}: text is not valid UTF-8")]
    InvalidText {
        /// 0-based attribute number.
        index: usize,
    },
}

fn span_end(offset: &u16, length: &u16) -> usize {
    *offset as usize + *length as usize
}

/// Returns `DecodeError::TruncatedInput` if the buffer is too small.
macro_rules! ensure_len {
    ($buf:expr, $required:expr, $what:expr) => {
        if $buf.len() < $required {
            return Err($crate::heap::DecodeError::TruncatedInput {
                what: $what,
                required: $required,
                available: $buf.len(),
            });
        }
    };
}

pub(crate) use ensure_len;
