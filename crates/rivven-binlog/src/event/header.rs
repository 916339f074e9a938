//! Event header and header decoders

use super::EventType;
use crate::error::{BinlogError, Result};
use crate::io::BinlogInputStream;
use serde::Serialize;
use std::fmt;

/// Binlog event header (v4 layout)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventHeader {
    /// Seconds since the unix epoch
    pub timestamp: u32,
    pub event_type: EventType,
    pub server_id: u32,
    /// Header + body + checksum length
    pub event_length: u32,
    pub next_position: u32,
    pub flags: u16,
}

impl EventHeader {
    pub const SIZE: usize = 19;

    /// Length of body plus checksum trailer.
    pub fn data_length(&self) -> u64 {
        u64::from(self.event_length).saturating_sub(Self::SIZE as u64)
    }

    pub fn timestamp_millis(&self) -> u64 {
        u64::from(self.timestamp) * 1000
    }
}

impl fmt::Display for EventHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} event (server_id={}, length={}, next_position={})",
            self.event_type, self.server_id, self.event_length, self.next_position
        )
    }
}

/// Decodes the fixed-layout prefix of every record.
pub trait EventHeaderDeserializer: Send {
    fn deserialize(&self, input: &mut BinlogInputStream) -> Result<EventHeader>;
}

/// Header decoder for binlog format v4 (MySQL 5.0+), 19 bytes little-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHeaderV4Deserializer;

impl EventHeaderDeserializer for EventHeaderV4Deserializer {
    fn deserialize(&self, input: &mut BinlogInputStream) -> Result<EventHeader> {
        let timestamp = input.read_u32_le()?;
        let event_type = EventType::from_u8(input.read_u8()?);
        let server_id = input.read_u32_le()?;
        let event_length = input.read_u32_le()?;
        let next_position = input.read_u32_le()?;
        let flags = input.read_u16_le()?;

        if (event_length as usize) < EventHeader::SIZE {
            return Err(BinlogError::invalid_header(format!(
                "event length {} shorter than {}-byte header ({:?})",
                event_length,
                EventHeader::SIZE,
                event_type
            )));
        }

        Ok(EventHeader {
            timestamp,
            event_type,
            server_id,
            event_length,
            next_position,
            flags,
        })
    }
}
