//! Attribute walk over a tuple's data area.
//!
//! ```text
//! +------------------------+ 0
//! | TupleHeader (23B)      |
//! +------------------------+ 23
//! | Null bitmap (optional) |
//! | padding                |
//! +------------------------+ t_hoff
//! | attr 0 (aligned)       |
//! | attr 1 (aligned)       |
//! | ...                    |
//! +------------------------+ lp_len
//! ```
//!
//! Null attributes take no space and are not aligned.

use std::fmt;

use log::trace;

use super::error::{DecodeError, ensure_len};
use super::layout::{NullBitmap, align_offset};
use super::schema::Schema;
use super::tuple_header::TupleHeader;
use super::value::Value;

/// Attribute values of one tuple, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Walks the attributes of `tuple` according to `schema`.
    ///
    /// `tuple` is the whole tuple, header included, and all offsets are
    /// relative to its first byte.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::TruncatedInput` if `t_hoff`, the null bitmap or
    /// an attribute runs past the tuple, and any varlena error unchanged.
    pub fn decode(
        tuple: &[u8],
        header: &TupleHeader,
        schema: &Schema,
    ) -> Result<Self, DecodeError> {
        let hoff = header.hoff as usize;
        ensure_len!(tuple, hoff, "tuple data");

        // t_hoff already points past the bitmap and its padding
        let nulls = NullBitmap::read(tuple, header)?;

        let mut offset = hoff;
        let mut values = Vec::with_capacity(schema.len());
        for (attnum, att) in schema.attributes().iter().enumerate() {
            if nulls.is_null(attnum) {
                values.push(Value::Null);
                continue;
            }

            offset = align_offset(offset, att.align);
            let (value, next) = att.decode_at(tuple, offset, attnum)?;
            trace!("attr {} ({}) at {}..{}", attnum, att.name, offset, next);
            values.push(value);
            offset = next;
        }

        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A row of the demo table `(id BIGINT, name TEXT)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl DecodedRecord {
    /// Decodes a tuple with [`Schema::demo`].
    pub fn decode(tuple: &[u8], header: &TupleHeader) -> Result<Self, DecodeError> {
        Record::decode(tuple, header, &Schema::demo()).map(Self::from_record)
    }

    /// Narrows a record decoded with the demo schema.
    pub fn from_record(record: Record) -> Self {
        let mut values = record.values.into_iter();
        let id = values.next().and_then(|v| v.as_i64());
        let name = match values.next() {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        };
        Self { id, name }
    }
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "id={}", id)?,
            None => f.write_str("id=NULL")?,
        }
        match &self.name {
            Some(name) => write!(f, ", name={:?}", name),
            None => f.write_str(", name=NULL"),
        }
    }
}
