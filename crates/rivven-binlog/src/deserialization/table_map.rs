use super::{DeserializationContext, EventDataDeserializer};
use crate::error::{BinlogError, Result};
use crate::event::{ColumnType, EventData, TableMapEvent};
use crate::io::BinlogInputStream;

/// TABLE_MAP_EVENT
///
/// ```text
/// [table_id: 6] [flags: 2] [schema_len: 1] [schema] [0x00]
/// [table_len: 1] [table] [0x00] [column_count: packed]
/// [column_types: column_count] [metadata_len: packed] [metadata]
/// [null_bitmap: (column_count + 7) / 8] [optional metadata: ignored]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TableMapEventDataDeserializer;

impl EventDataDeserializer for TableMapEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let table_id = input.read_u48_le()?;
        let flags = input.read_u16_le()?;

        let schema_len = input.read_u8()? as usize;
        let schema_name = input.read_string(schema_len)?;
        input.skip(1)?; // null terminator

        let table_len = input.read_u8()? as usize;
        let table_name = input.read_string(table_len)?;
        input.skip(1)?; // null terminator

        let column_count = input.read_packed_length()?;
        let column_types: Vec<ColumnType> = input
            .read_bytes(column_count)?
            .into_iter()
            .map(ColumnType::from_u8)
            .collect();

        let metadata_len = input.read_packed_length()?;
        let before = input.position();
        let column_metadata = read_column_metadata(input, &column_types)?;
        let consumed = (input.position() - before) as usize;
        if consumed > metadata_len {
            return Err(BinlogError::invalid_format(format!(
                "column metadata of {}.{} takes {} bytes, header declares {}",
                schema_name, table_name, consumed, metadata_len
            )));
        }
        input.skip(metadata_len - consumed)?;

        let column_nullability = input.read_bitmap(column_count)?;

        Ok(EventData::TableMap(TableMapEvent {
            table_id,
            flags,
            schema_name,
            table_name,
            column_types,
            column_metadata,
            column_nullability,
        }))
    }
}

fn read_column_metadata(
    input: &mut BinlogInputStream,
    column_types: &[ColumnType],
) -> Result<Vec<u16>> {
    let mut metadata = Vec::with_capacity(column_types.len());

    for column_type in column_types {
        let meta = match column_type {
            ColumnType::Float
            | ColumnType::Double
            | ColumnType::Blob
            | ColumnType::TinyBlob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Json
            | ColumnType::Geometry => u16::from(input.read_u8()?),
            ColumnType::Bit | ColumnType::Varchar | ColumnType::VarString => input.read_u16_le()?,
            ColumnType::NewDecimal => {
                let precision = input.read_u8()?;
                let scale = input.read_u8()?;
                (u16::from(precision) << 8) | u16::from(scale)
            }
            // real type in the high byte, length in the low byte
            ColumnType::String | ColumnType::Enum | ColumnType::Set => {
                input.read_uint_be(2)? as u16
            }
            ColumnType::Time2 | ColumnType::DateTime2 | ColumnType::Timestamp2 => {
                u16::from(input.read_u8()?)
            }
            _ => 0,
        };
        metadata.push(meta);
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialization::test_support::decode_body;
    use crate::deserialization::TableMapCache;
    use crate::event::EventType;

    fn table_map_body(table_id: u64) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&table_id.to_le_bytes()[..6]);
        body.extend_from_slice(&1u16.to_le_bytes());
        body.push(4);
        body.extend_from_slice(b"shop\0");
        body.push(6);
        body.extend_from_slice(b"orders\0");
        body.push(5); // columns
        body.extend_from_slice(&[3, 15, 246, 254, 18]); // LONG VARCHAR NEWDECIMAL STRING DATETIME2
        body.push(7); // metadata length
        body.extend_from_slice(&200u16.to_le_bytes()); // varchar(200)
        body.extend_from_slice(&[10, 2]); // decimal(10,2)
        body.extend_from_slice(&[0xFE, 0x10]); // char(16), big-endian
        body.push(3); // datetime(3)
        body.push(0b0001_1110); // nullability
        body
    }

    #[test]
    fn test_table_map() {
        let data = decode_body(
            &TableMapEventDataDeserializer,
            EventType::TableMap,
            &table_map_body(0x0000_0102_0304),
            &TableMapCache::new(),
        )
        .unwrap();

        let EventData::TableMap(table) = data else {
            panic!("expected table map, got {:?}", data);
        };
        assert_eq!(table.table_id, 0x0000_0102_0304);
        assert_eq!(table.flags, 1);
        assert_eq!(table.qualified_name(), "shop.orders");
        assert_eq!(
            table.column_types,
            vec![
                ColumnType::Long,
                ColumnType::Varchar,
                ColumnType::NewDecimal,
                ColumnType::String,
                ColumnType::DateTime2
            ]
        );
        assert_eq!(table.column_metadata, vec![0, 200, 0x0A02, 0xFE10, 3]);
        assert!(!table.column_nullability.is_set(0));
        assert!(table.column_nullability.is_set(1));
        assert_eq!(table.column_count(), 5);
    }

    #[test]
    fn test_table_map_skips_unparsed_metadata() {
        let mut body = table_map_body(9);
        // declare two extra metadata bytes and add them before the bitmap
        let bitmap = body.pop().unwrap();
        let metadata_len_at = body.len() - 8;
        body[metadata_len_at] = 9;
        body.extend_from_slice(&[0xEE, 0xEE, bitmap]);

        let data = decode_body(
            &TableMapEventDataDeserializer,
            EventType::TableMap,
            &body,
            &TableMapCache::new(),
        )
        .unwrap();
        let table = data.as_table_map().unwrap();
        assert!(table.column_nullability.is_set(1));
        assert!(!table.column_nullability.is_set(0));
    }

    #[test]
    fn test_table_map_metadata_overrun() {
        let mut body = table_map_body(9);
        let metadata_len_at = body.len() - 9;
        body[metadata_len_at] = 2;

        let result = decode_body(
            &TableMapEventDataDeserializer,
            EventType::TableMap,
            &body,
            &TableMapCache::new(),
        );
        assert!(matches!(result, Err(BinlogError::InvalidFormat(_))));
    }
}
