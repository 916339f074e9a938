//! Error types for binlog deserialization
//!
//! Errors are split by where in a record they occur, because that decides
//! whether the underlying stream is still positioned on a record boundary:
//!
//! - header failures surface as-is (no bounded region was opened yet)
//! - body failures are wrapped with the record header once the framer has
//!   skipped the rest of the body and the checksum trailer
//! - I/O failures during framing cleanup surface unwrapped and leave the
//!   stream position undefined

use crate::event::{EventHeader, EventType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Underlying byte source failed
    Io,
    /// Record framing is inconsistent (lengths, boundaries)
    Framing,
    /// A record body could not be decoded
    Decoding,
    /// Schema-related errors (missing table map, unsupported column type)
    Schema,
    /// Configuration errors (invalid settings)
    Configuration,
}

/// Binlog deserialization errors
#[derive(Error, Debug)]
pub enum BinlogError {
    /// I/O error from the byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A read inside a bounded region would cross its boundary
    #[error("Read of {requested} bytes exceeds block boundary ({available} bytes left)")]
    BlockBoundaryExceeded { requested: usize, available: usize },

    /// Reader used in a state that does not allow the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Event header could not be decoded
    #[error("Invalid event header: {0}")]
    InvalidHeader(String),

    /// Malformed field inside an event body
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Declared data length is smaller than the configured checksum length
    #[error(
        "Invalid length for {event_type:?} event: data length {data_length} < checksum length {checksum_length}"
    )]
    InvalidEventLength {
        event_type: EventType,
        data_length: u64,
        checksum_length: usize,
    },

    /// Declared data length exceeds the configured maximum
    #[error("Event data length {data_length} exceeds maximum {max}")]
    EventTooLarge { data_length: u64, max: u32 },

    /// Rows event refers to a table id with no preceding TABLE_MAP event
    #[error("No TABLE_MAP event found for table id {table_id}")]
    MissingTableMap { table_id: u64 },

    /// Column type that the row decoder cannot interpret
    #[error("Unsupported column type {column_type}")]
    UnsupportedColumnType { column_type: u8 },

    /// Event body decoding failed; the stream was still advanced past the record
    #[error("Failed to deserialize data of {header}: {source}")]
    EventDataDeserialization {
        header: Box<EventHeader>,
        #[source]
        source: Box<BinlogError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BinlogError {
    /// Create a new invalid header error
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create a new invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a body decoding failure with the header of the record it belongs to.
    pub fn event_data(header: EventHeader, source: BinlogError) -> Self {
        Self::EventDataDeserialization {
            header: Box::new(header),
            source: Box::new(source),
        }
    }

    /// Header of the failed record, when the failure carries one.
    pub fn header(&self) -> Option<&EventHeader> {
        match self {
            Self::EventDataDeserialization { header, .. } => Some(header),
            _ => None,
        }
    }

    /// Check whether the stream is still positioned on a record boundary.
    ///
    /// When this returns true the caller may skip the failed record and keep
    /// calling `next_event`.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // a short read inside the body means the source itself ran dry
            Self::EventDataDeserialization { source, .. } => !matches!(**source, Self::Io(_)),
            Self::InvalidEventLength { .. } | Self::EventTooLarge { .. } => true,

            Self::Io(_)
            | Self::BlockBoundaryExceeded { .. }
            | Self::InvalidState(_)
            | Self::InvalidHeader(_)
            | Self::InvalidFormat(_)
            | Self::MissingTableMap { .. }
            | Self::UnsupportedColumnType { .. }
            | Self::Config(_) => false,
        }
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Io,
            Self::BlockBoundaryExceeded { .. } => ErrorCategory::Framing,
            Self::InvalidState(_) => ErrorCategory::Framing,
            Self::InvalidHeader(_) => ErrorCategory::Framing,
            Self::InvalidEventLength { .. } => ErrorCategory::Framing,
            Self::EventTooLarge { .. } => ErrorCategory::Framing,
            Self::InvalidFormat(_) => ErrorCategory::Decoding,
            Self::EventDataDeserialization { .. } => ErrorCategory::Decoding,
            Self::MissingTableMap { .. } => ErrorCategory::Schema,
            Self::UnsupportedColumnType { .. } => ErrorCategory::Schema,
            Self::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::BlockBoundaryExceeded { .. } => "block_boundary_exceeded",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidHeader(_) => "invalid_header",
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidEventLength { .. } => "invalid_event_length",
            Self::EventTooLarge { .. } => "event_too_large",
            Self::MissingTableMap { .. } => "missing_table_map",
            Self::UnsupportedColumnType { .. } => "unsupported_column_type",
            Self::EventDataDeserialization { .. } => "event_data_deserialization",
            Self::Config(_) => "config_error",
        }
    }
}

/// Result type for binlog operations
pub type Result<T> = std::result::Result<T, BinlogError>;
