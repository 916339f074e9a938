//! Row image column value decoding
//!
//! Values are decoded using the column type and metadata from the
//! preceding TABLE_MAP event. Date/time packing follows the MySQL storage
//! formats (`TIME2`, `DATETIME2` and `TIMESTAMP2` are big-endian, the
//! legacy types little-endian).

use super::json::decode_json;
use crate::error::{BinlogError, Result};
use crate::event::{Bitmap, ColumnType, ColumnValue};
use crate::io::BinlogInputStream;
use bytes::Buf;

/// Bytes used by a leftover group of 0..=9 decimal digits
const DIG_TO_BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];
const DIGITS_PER_WORD: usize = 9;

/// Decode one non-null column value.
pub(crate) fn read_column_value(
    input: &mut BinlogInputStream,
    column_type: ColumnType,
    meta: u16,
) -> Result<ColumnValue> {
    let value = match column_type {
        ColumnType::Tiny => ColumnValue::SignedInt(i64::from(input.read_u8()? as i8)),
        ColumnType::Short => ColumnValue::SignedInt(i64::from(input.read_u16_le()? as i16)),
        ColumnType::Int24 => {
            let raw = input.read_u24_le()?;
            // sign-extend from 24 bits
            ColumnValue::SignedInt(i64::from(((raw << 8) as i32) >> 8))
        }
        ColumnType::Long => ColumnValue::SignedInt(i64::from(input.read_u32_le()? as i32)),
        ColumnType::LongLong => ColumnValue::SignedInt(input.read_u64_le()? as i64),
        ColumnType::Float => ColumnValue::Float(f32::from_bits(input.read_u32_le()?)),
        ColumnType::Double => ColumnValue::Double(f64::from_bits(input.read_u64_le()?)),
        ColumnType::NewDecimal => {
            let precision = (meta >> 8) as usize;
            let scale = (meta & 0xFF) as usize;
            ColumnValue::Decimal(read_decimal(input, precision, scale)?)
        }
        ColumnType::Year => ColumnValue::Year(1900 + u16::from(input.read_u8()?)),
        ColumnType::Date => {
            let packed = input.read_u24_le()?;
            ColumnValue::Date {
                year: (packed >> 9) as u16,
                month: ((packed >> 5) & 0x0F) as u8,
                day: (packed & 0x1F) as u8,
            }
        }
        ColumnType::Time => {
            // HHMMSS as a decimal number
            let packed = input.read_u24_le()?;
            ColumnValue::Time {
                hours: (packed / 10_000) as u16,
                minutes: ((packed / 100) % 100) as u8,
                seconds: (packed % 100) as u8,
                microseconds: 0,
                negative: false,
            }
        }
        ColumnType::Time2 => read_time2(input, meta)?,
        ColumnType::DateTime => {
            // YYYYMMDDhhmmss as a decimal number
            let packed = input.read_u64_le()?;
            ColumnValue::DateTime {
                year: (packed / 10_000_000_000) as u16,
                month: ((packed / 100_000_000) % 100) as u8,
                day: ((packed / 1_000_000) % 100) as u8,
                hour: ((packed / 10_000) % 100) as u8,
                minute: ((packed / 100) % 100) as u8,
                second: (packed % 100) as u8,
                microsecond: 0,
            }
        }
        ColumnType::DateTime2 => read_datetime2(input, meta)?,
        ColumnType::Timestamp => ColumnValue::Timestamp {
            seconds: input.read_u32_le()?,
            microseconds: 0,
        },
        ColumnType::Timestamp2 => {
            let seconds = input.read_uint_be(4)? as u32;
            let microseconds = read_fractional_seconds(input, meta)?;
            ColumnValue::Timestamp {
                seconds,
                microseconds,
            }
        }
        ColumnType::Varchar | ColumnType::VarString => {
            let len = if meta < 256 {
                usize::from(input.read_u8()?)
            } else {
                usize::from(input.read_u16_le()?)
            };
            ColumnValue::String(input.read_string(len)?)
        }
        ColumnType::String => read_string_column(input, meta)?,
        ColumnType::Enum => read_enum(input, usize::from(meta & 0xFF))?,
        ColumnType::Set => read_set(input, usize::from(meta & 0xFF))?,
        ColumnType::Bit => {
            let bits = usize::from(meta >> 8) * 8 + usize::from(meta & 0xFF);
            let mut bytes = input.read_bytes(bits.div_ceil(8))?;
            // stored most significant byte first
            bytes.reverse();
            ColumnValue::Bit(Bitmap::from_bytes(bytes, bits))
        }
        ColumnType::Blob
        | ColumnType::TinyBlob
        | ColumnType::MediumBlob
        | ColumnType::LongBlob
        | ColumnType::Geometry => ColumnValue::Bytes(read_blob(input, meta)?),
        ColumnType::Json => ColumnValue::Json(decode_json(&read_blob(input, meta)?)),
        other => {
            return Err(BinlogError::UnsupportedColumnType {
                column_type: other.code(),
            })
        }
    };

    Ok(value)
}

/// Length-prefixed binary value; `meta` is the width of the prefix (1..=4).
fn read_blob(input: &mut BinlogInputStream, meta: u16) -> Result<Vec<u8>> {
    if !(1..=4).contains(&meta) {
        return Err(BinlogError::invalid_format(format!(
            "blob length prefix of {} bytes",
            meta
        )));
    }
    let len = input.read_uint_le(usize::from(meta))? as usize;
    input.read_bytes(len)
}

/// STRING columns carry their real type (CHAR, ENUM or SET) and maximum
/// length in the metadata. Lengths above 255 borrow two bits of the type byte.
fn read_string_column(input: &mut BinlogInputStream, meta: u16) -> Result<ColumnValue> {
    let mut real_type = ColumnType::String;
    let mut length = usize::from(meta);

    if meta >= 256 {
        let byte0 = (meta >> 8) as u8;
        let byte1 = usize::from(meta & 0xFF);
        if byte0 & 0x30 != 0x30 {
            real_type = ColumnType::from_u8(byte0 | 0x30);
            length = byte1 | (usize::from((byte0 & 0x30) ^ 0x30) << 4);
        } else {
            real_type = ColumnType::from_u8(byte0);
            length = byte1;
        }
    }

    match real_type {
        ColumnType::Enum => read_enum(input, length),
        ColumnType::Set => read_set(input, length),
        _ => {
            let len = if length < 256 {
                usize::from(input.read_u8()?)
            } else {
                usize::from(input.read_u16_le()?)
            };
            Ok(ColumnValue::String(input.read_string(len)?))
        }
    }
}

fn read_enum(input: &mut BinlogInputStream, width: usize) -> Result<ColumnValue> {
    match width {
        1 | 2 => Ok(ColumnValue::Enum(input.read_uint_le(width)? as u16)),
        other => Err(BinlogError::invalid_format(format!(
            "enum value of {} bytes",
            other
        ))),
    }
}

fn read_set(input: &mut BinlogInputStream, width: usize) -> Result<ColumnValue> {
    Ok(ColumnValue::Set(input.read_uint_le(width)?))
}

/// Fractional seconds for `fsp` digits of precision, in microseconds.
fn read_fractional_seconds(input: &mut BinlogInputStream, fsp: u16) -> Result<u32> {
    let width = usize::from(fsp).div_ceil(2);
    if width == 0 {
        return Ok(0);
    }
    if width > 3 {
        return Err(BinlogError::invalid_format(format!(
            "fractional second precision {}",
            fsp
        )));
    }
    let value = input.read_uint_be(width)? as u32;
    Ok(value * 10u32.pow(6 - 2 * width as u32))
}

/// 5 bytes big-endian: sign(1) year*13+month(17) day(5) hour(5) minute(6) second(6)
fn read_datetime2(input: &mut BinlogInputStream, meta: u16) -> Result<ColumnValue> {
    let packed = input.read_uint_be(5)?;
    let microsecond = read_fractional_seconds(input, meta)?;

    let year_month = (packed >> 22) & 0x1_FFFF;
    Ok(ColumnValue::DateTime {
        year: (year_month / 13) as u16,
        month: (year_month % 13) as u8,
        day: ((packed >> 17) & 0x1F) as u8,
        hour: ((packed >> 12) & 0x1F) as u8,
        minute: ((packed >> 6) & 0x3F) as u8,
        second: (packed & 0x3F) as u8,
        microsecond,
    })
}

/// 3 bytes big-endian, offset by 0x800000: sign(1) unused(1) hour(10) minute(6) second(6)
fn read_time2(input: &mut BinlogInputStream, meta: u16) -> Result<ColumnValue> {
    let packed = input.read_uint_be(3)? as i64 - 0x80_0000;
    let microseconds = read_fractional_seconds(input, meta)?;

    let negative = packed < 0;
    let value = packed.unsigned_abs();
    Ok(ColumnValue::Time {
        hours: ((value >> 12) & 0x3FF) as u16,
        minutes: ((value >> 6) & 0x3F) as u8,
        seconds: (value & 0x3F) as u8,
        microseconds,
        negative,
    })
}

/// NEWDECIMAL: groups of 9 digits in 4 bytes, leftover digits in fewer,
/// big-endian, sign stored in the top bit and negatives bit-inverted.
fn read_decimal(input: &mut BinlogInputStream, precision: usize, scale: usize) -> Result<String> {
    if precision == 0 || scale > precision {
        return Err(BinlogError::invalid_format(format!(
            "decimal({},{})",
            precision, scale
        )));
    }

    let int_digits = precision - scale;
    let int_words = int_digits / DIGITS_PER_WORD;
    let int_leftover = DIG_TO_BYTES[int_digits % DIGITS_PER_WORD];
    let frac_words = scale / DIGITS_PER_WORD;
    let frac_leftover_digits = scale % DIGITS_PER_WORD;
    let frac_leftover = DIG_TO_BYTES[frac_leftover_digits];

    let size = int_leftover + int_words * 4 + frac_words * 4 + frac_leftover;
    let mut bytes = input.read_bytes(size)?;

    let negative = bytes[0] & 0x80 == 0;
    bytes[0] ^= 0x80;
    if negative {
        bytes.iter_mut().for_each(|b| *b = !*b);
    }

    let mut buf = bytes.as_slice();
    let mut integer = String::new();

    if int_leftover > 0 {
        let group = buf.get_uint(int_leftover);
        if group > 0 {
            integer.push_str(&group.to_string());
        }
    }
    for _ in 0..int_words {
        let group = buf.get_u32();
        if integer.is_empty() {
            if group > 0 {
                integer.push_str(&group.to_string());
            }
        } else {
            integer.push_str(&format!("{:09}", group));
        }
    }
    if integer.is_empty() {
        integer.push('0');
    }

    let mut out = String::with_capacity(precision + 2);
    if negative {
        out.push('-');
    }
    out.push_str(&integer);

    if scale > 0 {
        out.push('.');
        for _ in 0..frac_words {
            out.push_str(&format!("{:09}", buf.get_u32()));
        }
        if frac_leftover > 0 {
            let group = buf.get_uint(frac_leftover);
            out.push_str(&format!("{:0width$}", group, width = frac_leftover_digits));
        }
    }

    Ok(out)
}
