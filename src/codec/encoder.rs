//! Binary encoder.

use super::{varint, FieldRef, Message};
use crate::error::{Error, Result};
use crate::schema::{fields_of, FieldDescriptor, FieldKind, RecordType, WireKind};

/// Encode a record to a fresh buffer.
pub fn encode(msg: &dyn Message) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(&mut buf, msg)?;
    Ok(buf)
}

/// Append the encoding of `msg` to `buf`.
///
/// The whole record tree is validated before the first byte is written, so on
/// error `buf` is exactly as it was.
pub fn encode_into(buf: &mut Vec<u8>, msg: &dyn Message) -> Result<()> {
    validate(msg)?;

    let start = buf.len();
    buf.reserve(encoded_len(msg));
    write_fields(buf, msg);

    tracing::debug!(
        record = %msg.record_type(),
        bytes = buf.len() - start,
        "encoded record"
    );
    Ok(())
}

/// Number of bytes `encode` produces for `msg`.
pub fn encoded_len(msg: &dyn Message) -> usize {
    let mut len = 0;
    for field in fields_of(msg.record_type()) {
        for value in msg.values(field) {
            len += varint::encoded_len(key(field.tag, field.kind.wire_kind()));
            len += payload_len(&value);
        }
    }
    len
}

fn payload_len(value: &FieldRef<'_>) -> usize {
    match value {
        FieldRef::Int(v) => varint::encoded_len(varint::zigzag(*v)),
        FieldRef::Enum(v) => varint::encoded_len(enum_bits(*v)),
        FieldRef::Str(s) => prefixed_len(s.len()),
        FieldRef::Message(m) => prefixed_len(encoded_len(*m)),
    }
}

fn prefixed_len(len: usize) -> usize {
    varint::encoded_len(len as u64) + len
}

fn validate(msg: &dyn Message) -> Result<()> {
    let record = msg.record_type();
    for field in fields_of(record) {
        let values = msg.values(field);
        if values.is_empty() && field.is_required() {
            return Err(Error::SchemaViolation {
                record,
                field: field.name,
            });
        }
        if values.len() > 1 && !field.kind.is_repeated() {
            return Err(Error::InvalidOperation(format!(
                "{record} field `{}` is singular but has {} values",
                field.name,
                values.len()
            )));
        }
        for value in &values {
            check_kind(record, field, value)?;
            if let FieldRef::Message(nested) = value {
                validate(*nested)?;
            }
        }
    }
    Ok(())
}

fn check_kind(record: RecordType, field: &FieldDescriptor, value: &FieldRef<'_>) -> Result<()> {
    let ok = match (field.kind.element(), value) {
        (FieldKind::Int, FieldRef::Int(_)) => true,
        (FieldKind::String, FieldRef::Str(_)) => true,
        (FieldKind::Enum(_), FieldRef::Enum(_)) => true,
        (FieldKind::Message(expected), FieldRef::Message(m)) => m.record_type() == *expected,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidOperation(format!(
            "{record} field `{}` produced a value of the wrong kind",
            field.name
        )))
    }
}

fn write_fields(buf: &mut Vec<u8>, msg: &dyn Message) {
    for field in fields_of(msg.record_type()) {
        for value in msg.values(field) {
            varint::write(buf, key(field.tag, field.kind.wire_kind()));
            match value {
                FieldRef::Int(v) => varint::write(buf, varint::zigzag(v)),
                FieldRef::Enum(v) => varint::write(buf, enum_bits(v)),
                FieldRef::Str(s) => {
                    varint::write(buf, s.len() as u64);
                    buf.extend_from_slice(s.as_bytes());
                }
                FieldRef::Message(m) => {
                    varint::write(buf, encoded_len(m) as u64);
                    write_fields(buf, m);
                }
            }
        }
    }
}

pub(super) fn key(tag: u32, wire: WireKind) -> u64 {
    (u64::from(tag) << 3) | u64::from(wire.to_bits())
}

/// Enum numbers are sign-extended, as every decoder of this layout expects.
fn enum_bits(v: i32) -> u64 {
    i64::from(v) as u64
}
