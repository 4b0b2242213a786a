//! Variable-length attribute headers (varlena), little-endian layout.
//!
//! ```text
//! xxxxxxx1                             short: 1-byte header, length in bits 1..7
//! xxxxxx00 xxxxxxxx xxxxxxxx xxxxxxxx  long:  4-byte header, length in bits 2..31
//! xxxxxx10 ...                         compressed inline (not supported)
//! ```
//!
//! Both supported lengths include the header itself.

use super::error::{DecodeError, ensure_len};

/// Size of a long varlena header.
pub const VARHDRSZ: usize = 4;

/// Size of a short varlena header.
pub const VARHDRSZ_SHORT: usize = 1;

/// Decoded varlena header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarlenaHeader {
    /// 1-byte header; `total` includes the header byte.
    Short { total: usize },
    /// 4-byte uncompressed header; `total` includes the 4 header bytes.
    Long { total: usize },
    /// Compressed or out-of-line value.
    Unsupported { header: u32 },
}

impl VarlenaHeader {
    /// Decodes the header starting at `data[offset]`.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::TruncatedInput` if the header does not fit and
    /// `DecodeError::InvalidEncoding` if its length is shorter than the
    /// header itself.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, DecodeError> {
        ensure_len!(data, offset + VARHDRSZ_SHORT, "varlena header");
        let first = data[offset];

        if first & 0x01 == 0x01 {
            let total = (first >> 1) as usize;
            if total < VARHDRSZ_SHORT {
                return Err(DecodeError::InvalidEncoding(format!(
                    "short varlena length {} < {}",
                    total, VARHDRSZ_SHORT
                )));
            }
            return Ok(VarlenaHeader::Short { total });
        }

        ensure_len!(data, offset + VARHDRSZ, "varlena header");
        let word = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);

        if word & 0x03 != 0x00 {
            return Ok(VarlenaHeader::Unsupported { header: word });
        }

        let total = (word >> 2) as usize;
        if total < VARHDRSZ {
            return Err(DecodeError::InvalidEncoding(format!(
                "long varlena length {} < {}",
                total, VARHDRSZ
            )));
        }
        Ok(VarlenaHeader::Long { total })
    }

    /// Bytes taken by the header.
    pub fn header_len(&self) -> usize {
        match self {
            VarlenaHeader::Short { .. } => VARHDRSZ_SHORT,
            VarlenaHeader::Long { .. } | VarlenaHeader::Unsupported { .. } => VARHDRSZ,
        }
    }
}

/// Reads the varlena at `data[offset]`.
///
/// Returns the payload (without header) and the offset just past the value.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedEncoding` for compressed and out-of-line
/// values, `DecodeError::TruncatedInput` if the payload runs past `data`.
pub fn read_varlena(data: &[u8], offset: usize) -> Result<(&[u8], usize), DecodeError> {
    let header = VarlenaHeader::parse(data, offset)?;
    let total = match header {
        VarlenaHeader::Short { total } | VarlenaHeader::Long { total } => total,
        VarlenaHeader::Unsupported { header } => {
            return Err(DecodeError::UnsupportedEncoding { header });
        }
    };

    let end = offset + total;
    ensure_len!(data, end, "varlena payload");
    Ok((&data[offset + header.header_len()..end], end))
}
