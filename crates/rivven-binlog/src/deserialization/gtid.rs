use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, GtidEvent};
use crate::io::BinlogInputStream;
use uuid::Uuid;

/// GTID_LOG_EVENT: `[flags: 1] [source_id: 16] [gno: 8] [...]`
///
/// Logical clock fields that newer servers append are left to the framer.
#[derive(Debug, Clone, Copy, Default)]
pub struct GtidEventDataDeserializer;

impl EventDataDeserializer for GtidEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let flags = input.read_u8()?;
        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&input.read_bytes(16)?);
        let gno = input.read_u64_le()?;

        Ok(EventData::Gtid(GtidEvent {
            flags,
            source_id: Uuid::from_bytes(uuid),
            gno,
        }))
    }
}
