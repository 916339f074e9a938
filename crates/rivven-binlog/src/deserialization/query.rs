use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, QueryEvent};
use crate::io::BinlogInputStream;

/// QUERY_EVENT
///
/// ```text
/// [thread_id: 4] [exec_time: 4] [schema_len: 1] [error_code: 2]
/// [status_vars_len: 2] [status_vars] [schema] [0x00] [query: rest]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEventDataDeserializer;

impl EventDataDeserializer for QueryEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let thread_id = input.read_u32_le()?;
        let exec_time = input.read_u32_le()?;
        let schema_len = input.read_u8()? as usize;
        let error_code = input.read_u16_le()?;
        let status_vars_len = input.read_u16_le()? as usize;
        input.skip(status_vars_len)?;
        let schema = input.read_string(schema_len)?;
        input.skip(1)?; // null terminator
        let query = String::from_utf8_lossy(&input.read_remaining()?).into_owned();

        Ok(EventData::Query(QueryEvent {
            thread_id,
            exec_time,
            error_code,
            schema,
            query,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialization::test_support::decode_body;
    use crate::deserialization::TableMapCache;
    use crate::event::EventType;

    fn query_body(schema: &str, status_vars: &[u8], sql: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&11u32.to_le_bytes());
        body.extend_from_slice(&2u32.to_le_bytes());
        body.push(schema.len() as u8);
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&(status_vars.len() as u16).to_le_bytes());
        body.extend_from_slice(status_vars);
        body.extend_from_slice(schema.as_bytes());
        body.push(0);
        body.extend_from_slice(sql.as_bytes());
        body
    }

    #[test]
    fn test_query() {
        let body = query_body("shop", &[0x00, 0x01, 0x02, 0x03], "CREATE TABLE t (id INT)");
        let data = decode_body(
            &QueryEventDataDeserializer,
            EventType::Query,
            &body,
            &TableMapCache::new(),
        )
        .unwrap();

        let EventData::Query(query) = data else {
            panic!("expected query, got {:?}", data);
        };
        assert_eq!(query.thread_id, 11);
        assert_eq!(query.exec_time, 2);
        assert_eq!(query.error_code, 0);
        assert_eq!(query.schema, "shop");
        assert_eq!(query.query, "CREATE TABLE t (id INT)");
    }

    #[test]
    fn test_query_status_vars_past_body() {
        let mut body = query_body("", &[], "BEGIN");
        body[11] = 0xFF; // status_vars_len
        let result = decode_body(
            &QueryEventDataDeserializer,
            EventType::Query,
            &body,
            &TableMapCache::new(),
        );
        assert!(matches!(
            result,
            Err(crate::BinlogError::BlockBoundaryExceeded { .. })
        ));
    }
}
