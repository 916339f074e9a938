//! Event deserialization: framing, dispatch and table map tracking
//!
//! ```text
//! BinlogInputStream ─▶ EventHeaderDeserializer ─▶ framer ─▶ EventDataDeserializer ─▶ Event
//!                                                   │              │
//!                                                   │              └── TableMapCache (lookup)
//!                                                   └── skip body remainder + checksum
//! ```
//!
//! [`EventDeserializer::next_event`] reads one header, bounds the body to
//! `data_length - checksum_length` bytes, runs the registered body decoder
//! inside that bound and always leaves the stream on the next record
//! boundary. Successfully decoded TABLE_MAP bodies are cached by table id
//! for the rows decoders that follow.

mod cache;
mod column;
mod format_description;
mod gtid;
mod json;
mod null;
mod query;
mod registry;
mod rotate;
mod rows;
mod rows_query;
mod table_map;
mod xid;

pub use cache::TableMapCache;
pub use format_description::FormatDescriptionEventDataDeserializer;
pub use gtid::GtidEventDataDeserializer;
pub use null::NullEventDataDeserializer;
pub use query::QueryEventDataDeserializer;
pub use registry::DeserializerRegistry;
pub use rotate::RotateEventDataDeserializer;
pub use rows::{RowsEventDataDeserializer, RowsKind};
pub use rows_query::RowsQueryEventDataDeserializer;
pub use table_map::TableMapEventDataDeserializer;
pub use xid::XidEventDataDeserializer;

use crate::config::{BinlogConfig, ChecksumType};
use crate::error::{BinlogError, Result};
use crate::event::{
    Event, EventData, EventHeader, EventHeaderDeserializer, EventHeaderV4Deserializer, EventType,
};
use crate::io::BinlogInputStream;
use tracing::{debug, trace, warn};

/// State a body decoder may consult besides its bounded input.
#[derive(Debug, Clone, Copy)]
pub struct DeserializationContext<'a> {
    /// Header of the record being decoded
    pub header: &'a EventHeader,
    /// Table maps seen so far on this stream
    pub table_maps: &'a TableMapCache,
}

/// Decodes one event body.
///
/// The input is bounded to the body: reads past it fail, and bytes left
/// unread are skipped by the caller.
pub trait EventDataDeserializer: Send {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        ctx: &DeserializationContext<'_>,
    ) -> Result<EventData>;
}

/// Binlog event deserializer with decoder registry and table map cache
pub struct EventDeserializer {
    header_deserializer: Box<dyn EventHeaderDeserializer>,
    registry: DeserializerRegistry,
    table_map_cache: TableMapCache,
    checksum_length: usize,
    max_event_size: Option<u32>,
}

impl std::fmt::Debug for EventDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDeserializer")
            .field("registry", &self.registry)
            .field("table_map_cache", &self.table_map_cache)
            .field("checksum_length", &self.checksum_length)
            .field("max_event_size", &self.max_event_size)
            .finish_non_exhaustive()
    }
}

impl Default for EventDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDeserializer {
    /// v4 headers, the standard decoder set and no checksum.
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(EventHeaderV4Deserializer),
            DeserializerRegistry::standard(),
        )
    }

    pub fn with_config(config: &BinlogConfig) -> Result<Self> {
        config.validate()?;
        let mut deserializer = Self::new();
        deserializer.set_checksum_type(config.checksum_type);
        deserializer.max_event_size = config.max_event_size;
        Ok(deserializer)
    }

    /// Custom header decoder and registry.
    pub fn with_parts(
        header_deserializer: Box<dyn EventHeaderDeserializer>,
        registry: DeserializerRegistry,
    ) -> Self {
        Self {
            header_deserializer,
            registry,
            table_map_cache: TableMapCache::new(),
            checksum_length: 0,
            max_event_size: None,
        }
    }

    /// Replace the body decoder for `event_type`.
    ///
    /// Applies to records decoded after this call.
    pub fn set_event_data_deserializer<D>(&mut self, event_type: EventType, deserializer: D)
    where
        D: EventDataDeserializer + 'static,
    {
        self.registry.register(event_type, deserializer);
    }

    pub fn set_checksum_type(&mut self, checksum_type: ChecksumType) {
        self.set_checksum_length(checksum_type.length());
    }

    /// Trailer length excluded from every subsequent event body.
    pub fn set_checksum_length(&mut self, checksum_length: usize) {
        if checksum_length != self.checksum_length {
            debug!(
                "Checksum length changed from {} to {} bytes",
                self.checksum_length, checksum_length
            );
        }
        self.checksum_length = checksum_length;
    }

    pub fn checksum_length(&self) -> usize {
        self.checksum_length
    }

    pub fn registry(&self) -> &DeserializerRegistry {
        &self.registry
    }

    /// Table maps seen so far, for resolving rows events.
    pub fn table_map_cache(&self) -> &TableMapCache {
        &self.table_map_cache
    }

    /// Decode the next event.
    ///
    /// Returns `None` when the input has no more bytes. Header failures are
    /// returned as-is; body failures are wrapped in
    /// [`BinlogError::EventDataDeserialization`] after the stream has been
    /// moved to the next record.
    ///
    /// Records rejected by length ([`BinlogError::InvalidEventLength`],
    /// [`BinlogError::EventTooLarge`]) are skipped before the error is
    /// returned. If the input ends or fails during any skip, the I/O error
    /// is returned instead and the stream position can no longer be trusted.
    pub fn next_event(&mut self, input: &mut BinlogInputStream) -> Result<Option<Event>> {
        if input.peek()?.is_none() {
            return Ok(None);
        }

        let header = self.header_deserializer.deserialize(input)?;
        let data = self.deserialize_event_data(input, &header)?;

        if header.event_type == EventType::TableMap {
            if let EventData::TableMap(table_map) = &data {
                debug!(
                    "Caching table map {} -> {}",
                    table_map.table_id,
                    table_map.qualified_name()
                );
                self.table_map_cache.insert(table_map.clone());
            }
        }

        Ok(Some(Event::new(header, data)))
    }

    fn deserialize_event_data(
        &self,
        input: &mut BinlogInputStream,
        header: &EventHeader,
    ) -> Result<EventData> {
        let data_length = header.data_length();

        if let Some(max) = self.max_event_size {
            if data_length > u64::from(max) {
                input.skip(data_length as usize)?;
                return Err(BinlogError::EventTooLarge { data_length, max });
            }
        }

        let body_length = match data_length.checked_sub(self.checksum_length as u64) {
            Some(length) => length as usize,
            None => {
                input.skip(data_length as usize)?;
                return Err(BinlogError::InvalidEventLength {
                    event_type: header.event_type,
                    data_length,
                    checksum_length: self.checksum_length,
                });
            }
        };

        trace!(
            "Decoding {:?} event, {} bytes data, {} bytes body (checksum={})",
            header.event_type,
            data_length,
            body_length,
            self.checksum_length
        );

        let deserializer = self.registry.resolve(header.event_type);
        let ctx = DeserializationContext {
            header,
            table_maps: &self.table_map_cache,
        };

        let outcome = input.scoped_block(body_length, |body| deserializer.deserialize(body, &ctx))?;
        input.skip(self.checksum_length)?;

        outcome.map_err(|e| {
            warn!("Failed to decode {}: {}", header, e);
            BinlogError::event_data(header.clone(), e)
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Run `deserializer` over `body` the way the framer does.
    pub(crate) fn decode_body(
        deserializer: &dyn EventDataDeserializer,
        event_type: EventType,
        body: &[u8],
        table_maps: &TableMapCache,
    ) -> Result<EventData> {
        let header = EventHeader {
            timestamp: 0,
            event_type,
            server_id: 1,
            event_length: (EventHeader::SIZE + body.len()) as u32,
            next_position: 0,
            flags: 0,
        };
        let mut input = BinlogInputStream::from_bytes(body.to_vec());
        let ctx = DeserializationContext {
            header: &header,
            table_maps,
        };
        input.scoped_block(body.len(), |r| deserializer.deserialize(r, &ctx))?
    }
}
