use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, XidEvent};
use crate::io::BinlogInputStream;

/// XID_EVENT: `[xid: 8]`
#[derive(Debug, Clone, Copy, Default)]
pub struct XidEventDataDeserializer;

impl EventDataDeserializer for XidEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let xid = input.read_u64_le()?;
        Ok(EventData::Xid(XidEvent { xid }))
    }
}
