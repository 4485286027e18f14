//! Tolerant binary decoder.
//!
//! Unknown tags are skipped using their wire kind so that bytes written by a
//! newer schema still decode. Known tags must carry the wire kind their schema
//! kind implies.

use super::{varint, Decode, FieldValue};
use crate::error::{Error, Result};
use crate::schema::{self, fields_of, FieldDescriptor, FieldKind, WireKind};

/// Counters gathered while decoding one record (nested records excluded).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Known fields applied.
    pub fields: usize,
    /// Unknown fields skipped.
    pub skipped: usize,
}

/// Decode a record of type `T` from the whole of `bytes`.
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<T> {
    decode_with_stats(bytes).map(|(record, _)| record)
}

pub fn decode_with_stats<T: Decode>(bytes: &[u8]) -> Result<(T, DecodeStats)> {
    let mut input = bytes;
    let mut builder = T::Builder::default();
    let mut stats = DecodeStats::default();
    let mut seen: Vec<u32> = Vec::new();

    while !input.is_empty() {
        let (tag, wire) = read_key(&mut input)?;

        let Some(field) = schema::field(T::RECORD, tag) else {
            skip(&mut input, wire)?;
            stats.skipped += 1;
            tracing::debug!(record = %T::RECORD, tag, ?wire, "skipped unknown field");
            continue;
        };

        let expected = field.kind.wire_kind();
        if wire != expected {
            return Err(Error::SchemaMismatch {
                record: T::RECORD,
                field: field.name,
                tag,
                expected,
                found: wire,
            });
        }

        let value = read_value(&mut input, field)?;
        T::merge(&mut builder, field, value)?;
        stats.fields += 1;
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }

    if let Some(missing) = fields_of(T::RECORD)
        .iter()
        .find(|f| f.is_required() && !seen.contains(&f.tag))
    {
        return Err(Error::TruncatedRecord {
            record: T::RECORD,
            field: missing.name,
        });
    }

    let record = T::build(builder)?;
    Ok((record, stats))
}

fn read_key(input: &mut &[u8]) -> Result<(u32, WireKind)> {
    let key = varint::read(input)?;
    let bits = (key & 0x7) as u8;
    let wire = WireKind::from_bits(bits)
        .ok_or_else(|| Error::malformed(format!("unsupported wire kind {bits}")))?;
    let tag = u32::try_from(key >> 3)
        .map_err(|_| Error::malformed(format!("tag {} out of range", key >> 3)))?;
    if tag == 0 {
        return Err(Error::malformed("tag 0 is reserved"));
    }
    Ok((tag, wire))
}

fn read_value<'a>(input: &mut &'a [u8], field: &FieldDescriptor) -> Result<FieldValue<'a>> {
    let value = match field.kind.element() {
        FieldKind::Int => FieldValue::Int(varint::unzigzag(varint::read(input)?)),
        FieldKind::Enum(desc) => {
            let raw = varint::read(input)? as i64;
            match i32::try_from(raw).ok().filter(|n| desc.contains(*n)) {
                Some(n) => FieldValue::Enum(n),
                None => {
                    tracing::warn!(
                        field = field.name,
                        value = raw,
                        "unrecognized {} value, using default",
                        desc.name
                    );
                    FieldValue::Enum(desc.default)
                }
            }
        }
        FieldKind::String => {
            let bytes = read_prefixed(input)?;
            let s = std::str::from_utf8(bytes).map_err(|e| {
                Error::malformed(format!("field `{}` is not valid UTF-8: {e}", field.name))
            })?;
            FieldValue::Str(s.to_owned())
        }
        FieldKind::Message(_) => FieldValue::Message(read_prefixed(input)?),
        FieldKind::Repeated(_) => unreachable!("element() looks through Repeated"),
    };
    Ok(value)
}

fn read_prefixed<'a>(input: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = varint::read(input)?;
    let len = usize::try_from(len)
        .ok()
        .filter(|&len| len <= input.len())
        .ok_or_else(|| {
            Error::malformed(format!(
                "length {len} overruns input ({} bytes left)",
                input.len()
            ))
        })?;
    let (bytes, rest) = (*input).split_at(len);
    *input = rest;
    Ok(bytes)
}

fn take(input: &mut &[u8], n: usize) -> Result<()> {
    if input.len() < n {
        return Err(Error::malformed(format!(
            "fixed field needs {n} bytes, {} left",
            input.len()
        )));
    }
    let bytes = *input;
    *input = &bytes[n..];
    Ok(())
}

fn skip(input: &mut &[u8], wire: WireKind) -> Result<()> {
    match wire {
        WireKind::Varint => varint::read(input).map(|_| ()),
        WireKind::Fixed64 => take(input, 8),
        WireKind::Fixed32 => take(input, 4),
        WireKind::LengthDelimited => read_prefixed(input).map(|_| ()),
    }
}
