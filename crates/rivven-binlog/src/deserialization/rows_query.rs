use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, RowsQueryEvent};
use crate::io::BinlogInputStream;

/// ROWS_QUERY_LOG_EVENT: `[length: 1, ignored] [query: rest]`
///
/// The length byte truncates at 255, so the query is taken from the rest of
/// the body instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowsQueryEventDataDeserializer;

impl EventDataDeserializer for RowsQueryEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        input.skip(1)?;
        let query = String::from_utf8_lossy(&input.read_remaining()?).into_owned();
        Ok(EventData::RowsQuery(RowsQueryEvent { query }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialization::test_support::decode_body;
    use crate::deserialization::TableMapCache;
    use crate::event::EventType;

    #[test]
    fn test_rows_query_longer_than_length_byte() {
        let sql = format!("INSERT INTO t VALUES ('{}')", "x".repeat(300));
        let mut body = vec![255u8];
        body.extend_from_slice(sql.as_bytes());

        let data = decode_body(
            &RowsQueryEventDataDeserializer,
            EventType::RowsQuery,
            &body,
            &TableMapCache::new(),
        )
        .unwrap();
        assert!(matches!(data, EventData::RowsQuery(RowsQueryEvent { ref query }) if *query == sql));
    }
}
