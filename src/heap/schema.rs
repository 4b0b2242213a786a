//! Attribute descriptors for the tuple walk.
//!
//! Pages carry no type information, so the caller supplies the column list
//! of the relation. Each attribute is either fixed-width or varlena.

use super::error::DecodeError;
use super::layout::AttAlign;
use super::value::Value;

/// Fixed-width attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
}

impl FixedType {
    /// Stored width in bytes (`typlen`).
    pub const fn width(self) -> usize {
        match self {
            FixedType::Bool => 1,
            FixedType::Int2 => 2,
            FixedType::Int4 | FixedType::Float4 => 4,
            FixedType::Int8 | FixedType::Float8 => 8,
        }
    }

    /// Default alignment (`typalign`).
    pub const fn align(self) -> AttAlign {
        match self {
            FixedType::Bool => AttAlign::Char,
            FixedType::Int2 => AttAlign::Short,
            FixedType::Int4 | FixedType::Float4 => AttAlign::Int,
            FixedType::Int8 | FixedType::Float8 => AttAlign::Double,
        }
    }

    /// Decodes a little-endian value; `bytes` must be exactly `width()` long.
    fn decode(self, bytes: &[u8]) -> Value {
        let mut raw = [0u8; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        match self {
            FixedType::Bool => Value::Boolean(raw[0] != 0),
            FixedType::Int2 => Value::Int16(i16::from_le_bytes([raw[0], raw[1]])),
            FixedType::Int4 => Value::Int32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            FixedType::Int8 => Value::Int64(i64::from_le_bytes(raw)),
            FixedType::Float4 => {
                Value::Float32(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            FixedType::Float8 => Value::Float64(f64::from_le_bytes(raw)),
        }
    }
}

/// Variable-length attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Text,
    Bytea,
}

impl VarType {
    fn decode(self, payload: &[u8], attnum: usize) -> Result<Value, DecodeError> {
        match self {
            VarType::Text => std::str::from_utf8(payload)
                .map(|s| Value::Text(s.to_string()))
                .map_err(|_| DecodeError::InvalidText { index: attnum }),
            VarType::Bytea => Ok(Value::Bytea(payload.to_vec())),
        }
    }
}

/// Storage kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttKind {
    Fixed(FixedType),
    Varlena(VarType),
}

/// One column of a relation, as far as the tuple walk needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttKind,
    pub align: AttAlign,
}

impl Attribute {
    /// Fixed-width attribute with its type's default alignment.
    pub fn fixed(name: impl Into<String>, ty: FixedType) -> Self {
        Self {
            name: name.into(),
            kind: AttKind::Fixed(ty),
            align: ty.align(),
        }
    }

    /// Varlena attribute; text and bytea are int-aligned.
    pub fn varlena(name: impl Into<String>, ty: VarType) -> Self {
        Self {
            name: name.into(),
            kind: AttKind::Varlena(ty),
            align: AttAlign::Int,
        }
    }

    pub fn with_align(mut self, align: AttAlign) -> Self {
        self.align = align;
        self
    }

    /// Decodes this attribute's value at `data[offset]`, which must already be
    /// aligned. Returns the value and the offset just past it.
    pub(crate) fn decode_at(
        &self,
        data: &[u8],
        offset: usize,
        attnum: usize,
    ) -> Result<(Value, usize), DecodeError> {
        match self.kind {
            AttKind::Fixed(ty) => {
                let end = offset + ty.width();
                if data.len() < end {
                    return Err(DecodeError::TruncatedInput {
                        what: "fixed-width attribute",
                        required: end,
                        available: data.len(),
                    });
                }
                Ok((ty.decode(&data[offset..end]), end))
            }
            AttKind::Varlena(ty) => {
                let (payload, next) = super::varlena::read_varlena(data, offset)?;
                Ok((ty.decode(payload, attnum)?, next))
            }
        }
    }
}

/// Ordered attribute list of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// The demo table: `(id BIGINT, name TEXT)`.
    pub fn demo() -> Self {
        Self::new(vec![
            Attribute::fixed("id", FixedType::Int8),
            Attribute::varlena("name", VarType::Text),
        ])
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
