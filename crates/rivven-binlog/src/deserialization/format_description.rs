use super::{DeserializationContext, EventDataDeserializer};
use crate::error::Result;
use crate::event::{EventData, FormatDescriptionEvent};
use crate::io::BinlogInputStream;

const SERVER_VERSION_LENGTH: usize = 50;

/// FORMAT_DESCRIPTION_EVENT
///
/// ```text
/// [binlog_version: 2] [server_version: 50] [create_timestamp: 4]
/// [header_length: 1] [post_header_lengths: rest]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatDescriptionEventDataDeserializer;

impl EventDataDeserializer for FormatDescriptionEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let binlog_version = input.read_u16_le()?;
        let server_version = input
            .read_string(SERVER_VERSION_LENGTH)?
            .trim_end_matches('\0')
            .trim()
            .to_string();
        let create_timestamp = input.read_u32_le()?;
        let header_length = input.read_u8()?;
        let post_header_lengths = input.read_remaining()?;

        Ok(EventData::FormatDescription(FormatDescriptionEvent {
            binlog_version,
            server_version,
            create_timestamp,
            header_length,
            post_header_lengths,
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
    fn test_format_description() {
        let mut body = Vec::new();
        body.extend_from_slice(&4u16.to_le_bytes());
        let mut version = [0u8; 50];
        version[..10].copy_from_slice(b"8.0.35-log");
        body.extend_from_slice(&version);
        body.extend_from_slice(&1_700_000_000u32.to_le_bytes());
        body.push(19);
        body.extend_from_slice(&[56, 13, 0, 8, 0]);

        let data = decode_body(
            &FormatDescriptionEventDataDeserializer,
            EventType::FormatDescription,
            &body,
            &TableMapCache::new(),
        )
        .unwrap();

        let EventData::FormatDescription(fde) = data else {
            panic!("expected format description, got {:?}", data);
        };
        assert_eq!(fde.binlog_version, 4);
        assert_eq!(fde.server_version, "8.0.35-log");
        assert_eq!(fde.create_timestamp, 1_700_000_000);
        assert_eq!(fde.header_length, 19);
        assert_eq!(fde.post_header_lengths, vec![56, 13, 0, 8, 0]);
    }

    #[test]
    fn test_format_description_truncated() {
        let result = decode_body(
            &FormatDescriptionEventDataDeserializer,
            EventType::FormatDescription,
            &[4, 0, b'8'],
            &TableMapCache::new(),
        );
        assert!(result.is_err());
    }
}
