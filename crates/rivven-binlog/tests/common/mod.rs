//! Binlog record builders shared by the integration tests

#![allow(dead_code)]

use rivven_binlog::{BinlogInputStream, EventType};
use std::sync::Once;

pub const HEADER_SIZE: usize = 19;

static INIT: Once = Once::new();

/// Initialize test logging (idempotent)
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("rivven_binlog=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One v4 record: header, body and checksum trailer.
pub struct EventBuilder {
    event_type: u8,
    timestamp: u32,
    server_id: u32,
    next_position: u32,
    body: Vec<u8>,
    checksum: Vec<u8>,
}

impl EventBuilder {
    pub fn new(event_type: EventType) -> Self {
        Self::raw(event_type.code())
    }

    pub fn raw(event_type: u8) -> Self {
        Self {
            event_type,
            timestamp: 1_700_000_000,
            server_id: 1,
            next_position: 0,
            body: Vec::new(),
            checksum: Vec::new(),
        }
    }

    pub fn body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body = body.as_ref().to_vec();
        self
    }

    pub fn checksum(mut self, checksum: impl AsRef<[u8]>) -> Self {
        self.checksum = checksum.as_ref().to_vec();
        self
    }

    pub fn next_position(mut self, next_position: u32) -> Self {
        self.next_position = next_position;
        self
    }

    pub fn event_length(&self) -> usize {
        HEADER_SIZE + self.body.len() + self.checksum.len()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.event_length());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        data.push(self.event_type);
        data.extend_from_slice(&self.server_id.to_le_bytes());
        data.extend_from_slice(&(self.event_length() as u32).to_le_bytes());
        data.extend_from_slice(&self.next_position.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&self.body);
        data.extend_from_slice(&self.checksum);
        data
    }
}

/// Concatenate records into one stream.
pub fn stream(events: &[Vec<u8>]) -> BinlogInputStream {
    BinlogInputStream::from_bytes(events.concat())
}

pub fn xid_body(xid: u64) -> Vec<u8> {
    xid.to_le_bytes().to_vec()
}

pub fn query_body(schema: &str, sql: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&7u32.to_le_bytes()); // thread id
    body.extend_from_slice(&0u32.to_le_bytes()); // exec time
    body.push(schema.len() as u8);
    body.extend_from_slice(&0u16.to_le_bytes()); // error code
    body.extend_from_slice(&0u16.to_le_bytes()); // status vars
    body.extend_from_slice(schema.as_bytes());
    body.push(0);
    body.extend_from_slice(sql.as_bytes());
    body
}

/// TABLE_MAP body for a table of (LONG, VARCHAR(255)) columns.
pub fn table_map_body(table_id: u64, schema: &str, table: &str) -> Vec<u8> {
    let mut body = table_id.to_le_bytes()[..6].to_vec();
    body.extend_from_slice(&1u16.to_le_bytes());
    body.push(schema.len() as u8);
    body.extend_from_slice(schema.as_bytes());
    body.push(0);
    body.push(table.len() as u8);
    body.extend_from_slice(table.as_bytes());
    body.push(0);
    body.push(2); // column count
    body.extend_from_slice(&[3, 15]); // LONG, VARCHAR
    body.push(2); // metadata length
    body.extend_from_slice(&255u16.to_le_bytes());
    body.push(0b10); // nullability
    body
}

/// v2 WRITE_ROWS body with one `(id, name)` row per entry.
pub fn write_rows_body(table_id: u64, rows: &[(i32, &str)]) -> Vec<u8> {
    let mut body = table_id.to_le_bytes()[..6].to_vec();
    body.extend_from_slice(&0u16.to_le_bytes());
    body.extend_from_slice(&2u16.to_le_bytes()); // no extra data
    body.push(2);
    body.push(0b11);
    for (id, name) in rows {
        body.push(0);
        body.extend_from_slice(&id.to_le_bytes());
        body.push(name.len() as u8);
        body.extend_from_slice(name.as_bytes());
    }
    body
}
