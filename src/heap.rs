//! Decoding of PostgreSQL-style heap pages.
//!
//! A heap page is decoded leaf-first:
//!
//! ```text
//! page bytes --> PageHeader --> LinePointer[] --> bounds check
//!                                    |
//!                  (Normal slot) tuple span
//!                                    v
//!      TupleHeader --> NullBitmap / alignment --> varlena --> Record
//! ```
//!
//! - [`HeapPage`]: read-only view tying header, slots and tuples together
//! - [`PageHeader`]: the 24-byte page header
//! - [`LinePointer`]: packed 4-byte slot descriptors
//! - [`TupleHeader`]: the 23-byte fixed tuple header
//! - [`Schema`] / [`Record`]: schema-driven attribute walk
//!
//! Nothing in this module writes pages.

mod error;
mod layout;
mod line_pointer;
mod page;
mod record;
mod schema;
mod tuple_header;
mod value;
mod varlena;

pub use error::DecodeError;
pub use layout::{AttAlign, NullBitmap, align_offset};
pub use line_pointer::{
    LINE_POINTER_SIZE, LinePointer, LpState, MAX_LINE_POINTERS, read_line_pointers,
};
pub use page::{HeapPage, PAGE_HEADER_SIZE, PageHeader};
pub use record::{DecodedRecord, Record};
pub use schema::{AttKind, Attribute, FixedType, Schema, VarType};
pub use tuple_header::{Infomask, Infomask2, ItemPointer, TUPLE_HEADER_SIZE, TupleHeader};
pub use value::Value;
pub use varlena::{VARHDRSZ, VARHDRSZ_SHORT, VarlenaHeader, read_varlena};
