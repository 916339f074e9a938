//! Binlog file reader tests

mod common;

use common::{init_test_logging, query_body, table_map_body, xid_body, EventBuilder};
use pretty_assertions::assert_eq;
use rivven_binlog::{
    BinlogConfig, BinlogError, BinlogFileReader, ChecksumType, EventData, EventType, BINLOG_MAGIC,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_binlog(events: &[Vec<u8>]) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(&BINLOG_MAGIC)?;
    for event in events {
        file.write_all(event)?;
    }
    file.flush()?;
    Ok(file)
}

#[test]
fn test_read_binlog_file() -> anyhow::Result<()> {
    init_test_logging();

    let crc = [0x11, 0x22, 0x33, 0x44];
    let file = write_binlog(&[
        EventBuilder::new(EventType::Query)
            .body(query_body("app", "BEGIN"))
            .checksum(crc)
            .build(),
        EventBuilder::new(EventType::TableMap)
            .body(table_map_body(12, "app", "users"))
            .checksum(crc)
            .build(),
        EventBuilder::new(EventType::Xid)
            .body(xid_body(99))
            .checksum(crc)
            .build(),
    ])?;

    let config = BinlogConfig::new().with_checksum_type(ChecksumType::Crc32);
    let reader = BinlogFileReader::open_with_config(file.path(), &config)?;
    let types: Vec<EventType> = reader
        .map(|event| event.map(|e| e.event_type()))
        .collect::<Result<_, _>>()?;

    assert_eq!(
        types,
        vec![EventType::Query, EventType::TableMap, EventType::Xid]
    );
    Ok(())
}

#[test]
fn test_file_position_tracks_records() -> anyhow::Result<()> {
    let first = EventBuilder::new(EventType::Xid).body(xid_body(1)).build();
    let file = write_binlog(&[first.clone()])?;

    let mut reader = BinlogFileReader::open(file.path())?;
    assert_eq!(reader.position(), 4);

    let event = reader.next_event()?.expect("event");
    assert!(matches!(event.data(), EventData::Xid(x) if x.xid == 1));
    assert_eq!(reader.position(), 4 + first.len() as u64);
    assert!(reader.next_event()?.is_none());
    assert!(reader.next_event()?.is_none());
    Ok(())
}

#[test]
fn test_rejects_bad_magic() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"\xFEbim")?;
    file.flush()?;

    let err = BinlogFileReader::open(file.path()).unwrap_err();
    assert!(matches!(err, BinlogError::InvalidFormat(_)));
    Ok(())
}

#[test]
fn test_missing_file() {
    let err = BinlogFileReader::open("/nonexistent/mysql-bin.000001").unwrap_err();
    assert!(matches!(err, BinlogError::Io(_)));
}
