use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, RotateEvent};
use crate::io::BinlogInputStream;

/// ROTATE_EVENT: `[position: 8] [next_binlog: rest]`
#[derive(Debug, Clone, Copy, Default)]
pub struct RotateEventDataDeserializer;

impl EventDataDeserializer for RotateEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let position = input.read_u64_le()?;
        let name = input.read_remaining()?;
        let next_binlog = String::from_utf8_lossy(&name)
            .trim_end_matches('\0')
            .to_string();

        Ok(EventData::Rotate(RotateEvent {
            position,
            next_binlog,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deserialization::test_support::decode_body;
    use crate::deserialization::TableMapCache;
    use crate::event::EventType;

    #[test]
    fn test_rotate() {
        let mut body = 4u64.to_le_bytes().to_vec();
        body.extend_from_slice(b"mysql-bin.000042");

        let data = decode_body(
            &RotateEventDataDeserializer,
            EventType::Rotate,
            &body,
            &TableMapCache::new(),
        )
        .unwrap();

        assert!(matches!(
            data,
            EventData::Rotate(RotateEvent { position: 4, ref next_binlog }) if next_binlog == "mysql-bin.000042"
        ));
    }
}
