//! Schema-driven record codec.
//!
//! Records expose their field values through [`Message`] and accept decoded
//! values through [`Decode`]. The encoders and the decoder only ever consult
//! the tables in [`crate::schema`], so every wire format stays in lock-step
//! with the same field list.
//!
//! ## Binary layout
//!
//! Each present field is written as a `(key, payload)` pair in ascending tag
//! order, where the key is the varint `(tag << 3) | wire_kind`:
//!
//! - `Int`: zig-zag varint
//! - `Enum`: varint of the enum number
//! - `String`: varint length + UTF-8 bytes
//! - `Message`: varint length + the nested record's own pairs
//!
//! Absent optional fields are omitted and repeated fields emit one pair per
//! element.

mod decoder;
mod encoder;
pub mod json;
mod records;
pub mod varint;

pub use decoder::{decode, decode_with_stats, DecodeStats};
pub use encoder::{encode, encode_into, encoded_len};

use crate::error::Result;
use crate::schema::{FieldDescriptor, RecordType};

/// A field value borrowed from a record for encoding.
pub enum FieldRef<'a> {
    Int(i64),
    Str(&'a str),
    Enum(i32),
    Message(&'a dyn Message),
}

/// A record that can be rendered by any schema-driven encoder.
pub trait Message {
    fn record_type(&self) -> RecordType;

    /// Values present for `field`, in order. Empty when the field is absent.
    fn values(&self, field: &FieldDescriptor) -> Vec<FieldRef<'_>>;
}

/// A decoded field value, already checked against the schema kind.
#[derive(Debug)]
pub enum FieldValue<'a> {
    Int(i64),
    Str(String),
    Enum(i32),
    /// Raw bytes of a nested record, to be decoded as the schema's type.
    Message(&'a [u8]),
}

/// A record that can be reconstructed from decoded field values.
pub trait Decode: Sized {
    const RECORD: RecordType;

    type Builder: Default;

    /// Apply one occurrence of `field` to the builder.
    fn merge(
        builder: &mut Self::Builder,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
    ) -> Result<()>;

    fn build(builder: Self::Builder) -> Result<Self>;
}
