use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::EventData;
use crate::io::BinlogInputStream;

/// Fallback decoder: consumes nothing and yields [`EventData::Empty`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventDataDeserializer;

impl EventDataDeserializer for NullEventDataDeserializer {
    fn deserialize(
        &self,
        _input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        Ok(EventData::Empty)
    }
}
