//! # rivven-binlog - MySQL binary log deserialization
//!
//! Turns a MySQL/MariaDB binlog byte stream into typed events.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────────┐
//! │ BinlogInputStream│──▶│ EventHeader (v4) │──▶│ framer               │
//! │ (peek, blocks)   │   │ 19 bytes         │   │ body = data - crc    │
//! └──────────────────┘   └──────────────────┘   └──────────┬───────────┘
//!                                                          │
//!                         ┌────────────────────────────────┤
//!                         ▼                                ▼
//!               ┌──────────────────┐             ┌──────────────────┐
//!               │DeserializerRegistry            │ TableMapCache    │
//!               │ type -> decoder  │◀────────────│ table id -> map  │
//!               └────────┬─────────┘  rows events└──────────────────┘
//!                        ▼
//!               ┌──────────────────┐
//!               │ Event            │
//!               │ { header, data } │
//!               └──────────────────┘
//! ```
//!
//! Every record is consumed completely (body remainder and checksum
//! trailer included) whether or not its body decoded, so a failed record
//! never desynchronizes the stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rivven_binlog::{BinlogConfig, BinlogFileReader, ChecksumType, EventData};
//!
//! # fn example() -> rivven_binlog::Result<()> {
//! let config = BinlogConfig::new().with_checksum_type(ChecksumType::Crc32);
//! let mut reader = BinlogFileReader::open_with_config("mysql-bin.000001", &config)?;
//!
//! while let Some(event) = reader.next_event()? {
//!     if let EventData::WriteRows(rows) = event.data() {
//!         println!("{} rows inserted into table {}", rows.rows.len(), rows.table_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod deserialization;
pub mod error;
pub mod event;
pub mod io;
pub mod reader;

pub use config::{BinlogConfig, ChecksumType};
pub use deserialization::{
    DeserializationContext, DeserializerRegistry, EventDataDeserializer, EventDeserializer,
    TableMapCache,
};
pub use error::{BinlogError, ErrorCategory, Result};
pub use event::{
    ColumnType, ColumnValue, Event, EventData, EventHeader, EventHeaderDeserializer,
    EventHeaderV4Deserializer, EventType, RowData, RowsEvent, TableMapEvent,
};
pub use io::BinlogInputStream;
pub use reader::{BinlogEventReader, BinlogFileReader, StreamState, BINLOG_MAGIC};
