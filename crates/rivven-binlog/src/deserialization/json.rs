//! MySQL binary JSON decoding
//!
//! JSON columns are stored in the binlog in MySQL's binary document format
//! (see `sql/json_binary.h` in the server sources):
//!
//! ```text
//! doc     := type value
//! object  := count size key-entry* value-entry* key* value*
//! array   := count size value-entry* value*
//! key-entry   := offset length(u16)
//! value-entry := type offset-or-inline
//! ```
//!
//! Counts, sizes and offsets are 2 bytes in the small format and 4 bytes in
//! the large one. Offsets are relative to the start of the enclosing
//! object or array.

use crate::error::{BinlogError, Result};
use base64::Engine;
use serde_json::{Map, Value};
use tracing::trace;

const SMALL_OBJECT: u8 = 0x00;
const LARGE_OBJECT: u8 = 0x01;
const SMALL_ARRAY: u8 = 0x02;
const LARGE_ARRAY: u8 = 0x03;
const LITERAL: u8 = 0x04;
const INT16: u8 = 0x05;
const UINT16: u8 = 0x06;
const INT32: u8 = 0x07;
const UINT32: u8 = 0x08;
const INT64: u8 = 0x09;
const UINT64: u8 = 0x0A;
const DOUBLE: u8 = 0x0B;
const STRING: u8 = 0x0C;
const OPAQUE: u8 = 0x0F;

/// Deepest container nesting the server accepts in a JSON document
const MAX_NESTING_DEPTH: usize = 100;

const LITERAL_NULL: u8 = 0x00;
const LITERAL_TRUE: u8 = 0x01;
const LITERAL_FALSE: u8 = 0x02;

/// Decode a JSON column value.
///
/// Payloads that are not valid binary JSON are parsed as JSON text, and
/// kept as a string when that fails too.
pub(crate) fn decode_json(data: &[u8]) -> Value {
    let Some((&type_byte, doc)) = data.split_first() else {
        return Value::Null;
    };

    match parse_value(type_byte, doc, 0) {
        Ok(value) => value,
        Err(e) => {
            trace!("Binary JSON decode failed ({}), trying text", e);
            serde_json::from_slice(data)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(data).into_owned()))
        }
    }
}

/// `depth` is the number of containers enclosing `data`.
fn parse_value(type_byte: u8, data: &[u8], depth: usize) -> Result<Value> {
    match type_byte {
        SMALL_OBJECT => parse_container(data, false, true, depth + 1),
        LARGE_OBJECT => parse_container(data, true, true, depth + 1),
        SMALL_ARRAY => parse_container(data, false, false, depth + 1),
        LARGE_ARRAY => parse_container(data, true, false, depth + 1),
        LITERAL => Ok(literal(*data.first().unwrap_or(&LITERAL_NULL))),
        INT16 => Ok(Value::from(read_uint(data, 0, 2)? as u16 as i16)),
        UINT16 => Ok(Value::from(read_uint(data, 0, 2)? as u16)),
        INT32 => Ok(Value::from(read_uint(data, 0, 4)? as u32 as i32)),
        UINT32 => Ok(Value::from(read_uint(data, 0, 4)? as u32)),
        INT64 => Ok(Value::from(read_uint(data, 0, 8)? as i64)),
        UINT64 => Ok(Value::from(read_uint(data, 0, 8)?)),
        DOUBLE => Ok(Value::from(f64::from_bits(read_uint(data, 0, 8)?))),
        STRING => {
            let bytes = read_variable_bytes(data)?;
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        OPAQUE => {
            // column type of the wrapped value, then its raw bytes
            let rest = data.get(1..).ok_or_else(|| truncated("opaque value"))?;
            let bytes = read_variable_bytes(rest)?;
            Ok(match std::str::from_utf8(bytes) {
                Ok(text) => Value::String(text.to_string()),
                Err(_) => Value::String(base64::engine::general_purpose::STANDARD.encode(bytes)),
            })
        }
        other => Err(BinlogError::invalid_format(format!(
            "unknown binary JSON type 0x{:02x}",
            other
        ))),
    }
}

fn parse_container(data: &[u8], large: bool, object: bool, depth: usize) -> Result<Value> {
    if depth > MAX_NESTING_DEPTH {
        return Err(BinlogError::invalid_format(format!(
            "binary JSON nested deeper than {} levels",
            MAX_NESTING_DEPTH
        )));
    }

    let width = if large { 4 } else { 2 };
    let count = read_uint(data, 0, width)? as usize;
    let size = read_uint(data, width, width)? as usize;
    if size > data.len() {
        return Err(truncated("container"));
    }
    let data = &data[..size];

    let header = 2 * width;
    let key_entry = width + 2;
    let value_entry = width + 1;
    let entry_width = if object {
        key_entry + value_entry
    } else {
        value_entry
    };
    // keys and out-of-line values live after the entry tables
    let entries_end = count
        .checked_mul(entry_width)
        .and_then(|entries| entries.checked_add(header))
        .filter(|end| *end <= size)
        .ok_or_else(|| {
            BinlogError::invalid_format(format!(
                "binary JSON container claims {} entries in {} bytes",
                count, size
            ))
        })?;
    let values_start = if object {
        header + count * key_entry
    } else {
        header
    };

    let mut keys = Vec::with_capacity(if object { count } else { 0 });
    if object {
        for i in 0..count {
            let at = header + i * key_entry;
            let offset = read_uint(data, at, width)? as usize;
            let len = read_uint(data, at + width, 2)? as usize;
            if offset < entries_end {
                return Err(bad_offset("object key", offset));
            }
            let key = data
                .get(offset..offset + len)
                .ok_or_else(|| truncated("object key"))?;
            keys.push(String::from_utf8_lossy(key).into_owned());
        }
    }

    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let at = values_start + i * value_entry;
        let type_byte = *data.get(at).ok_or_else(|| truncated("value entry"))?;
        values.push(parse_entry(data, type_byte, at + 1, large, entries_end, depth)?);
    }

    if object {
        let map: Map<String, Value> = keys.into_iter().zip(values).collect();
        Ok(Value::Object(map))
    } else {
        Ok(Value::Array(values))
    }
}

/// Value referenced by a value entry. Literals and 16-bit integers are
/// stored inline, and so are 32-bit integers in the large format.
///
/// Out-of-line values must start at or after `entries_end`.
fn parse_entry(
    data: &[u8],
    type_byte: u8,
    at: usize,
    large: bool,
    entries_end: usize,
    depth: usize,
) -> Result<Value> {
    match type_byte {
        LITERAL => return Ok(literal(read_uint(data, at, 2)? as u8)),
        INT16 => return Ok(Value::from(read_uint(data, at, 2)? as u16 as i16)),
        UINT16 => return Ok(Value::from(read_uint(data, at, 2)? as u16)),
        INT32 if large => return Ok(Value::from(read_uint(data, at, 4)? as u32 as i32)),
        UINT32 if large => return Ok(Value::from(read_uint(data, at, 4)? as u32)),
        _ => {}
    }

    let width = if large { 4 } else { 2 };
    let offset = read_uint(data, at, width)? as usize;
    if offset < entries_end {
        return Err(bad_offset("value", offset));
    }
    let value = data
        .get(offset..)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| truncated("value offset"))?;
    parse_value(type_byte, value, depth)
}

fn literal(code: u8) -> Value {
    match code {
        LITERAL_TRUE => Value::Bool(true),
        LITERAL_FALSE => Value::Bool(false),
        _ => Value::Null,
    }
}

/// Little-endian unsigned integer of `width` bytes at `at`.
fn read_uint(data: &[u8], at: usize, width: usize) -> Result<u64> {
    let bytes = data
        .get(at..at + width)
        .ok_or_else(|| truncated("integer"))?;
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Bytes prefixed with a 7-bit-per-byte variable length (at most 5 bytes).
fn read_variable_bytes(data: &[u8]) -> Result<&[u8]> {
    let mut len = 0usize;
    let mut prefix = 0usize;
    loop {
        if prefix == 5 {
            return Err(BinlogError::invalid_format("variable length exceeds 5 bytes"));
        }
        let byte = *data.get(prefix).ok_or_else(|| truncated("variable length"))?;
        len |= usize::from(byte & 0x7F) << (7 * prefix);
        prefix += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }
    data.get(prefix..prefix + len)
        .ok_or_else(|| truncated("string data"))
}

fn bad_offset(what: &str, offset: usize) -> BinlogError {
    BinlogError::invalid_format(format!(
        "binary JSON {} offset {} points into the entry tables",
        what, offset
    ))
}

fn truncated(what: &str) -> BinlogError {
    BinlogError::invalid_format(format!("truncated binary JSON {}", what))
}
