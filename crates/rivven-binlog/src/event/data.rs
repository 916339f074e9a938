//! Event body payloads

use serde::Serialize;
use uuid::Uuid;

/// Decoded event body, one variant per supported event type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventData {
    /// No decoder registered for the event type; body was skipped
    Empty,

    /// Format description - contains binlog format info
    FormatDescription(FormatDescriptionEvent),

    /// Rotate to new binlog file
    Rotate(RotateEvent),

    /// Query (DDL/DML statements)
    Query(QueryEvent),

    /// Table map - maps table ID to schema
    TableMap(TableMapEvent),

    /// Transaction commit
    Xid(XidEvent),

    /// Row insert
    WriteRows(RowsEvent),

    /// Row update
    UpdateRows(RowsEvent),

    /// Row delete
    DeleteRows(RowsEvent),

    /// Original statement of a row-based change
    RowsQuery(RowsQueryEvent),

    /// GTID for transaction
    Gtid(GtidEvent),
}

impl EventData {
    pub fn is_empty(&self) -> bool {
        matches!(self, EventData::Empty)
    }

    pub fn as_table_map(&self) -> Option<&TableMapEvent> {
        match self {
            EventData::TableMap(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&RowsEvent> {
        match self {
            EventData::WriteRows(event)
            | EventData::UpdateRows(event)
            | EventData::DeleteRows(event) => Some(event),
            _ => None,
        }
    }
}

/// Format description event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatDescriptionEvent {
    pub binlog_version: u16,
    pub server_version: String,
    pub create_timestamp: u32,
    pub header_length: u8,
    /// Post-header length per event type (index = type code - 1), plus any
    /// trailing bytes the server appended
    pub post_header_lengths: Vec<u8>,
}

/// Rotate event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotateEvent {
    pub position: u64,
    pub next_binlog: String,
}

/// Query event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryEvent {
    pub thread_id: u32,
    pub exec_time: u32,
    pub error_code: u16,
    pub schema: String,
    pub query: String,
}

/// XID event (transaction commit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XidEvent {
    pub xid: u64,
}

/// Rows query event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowsQueryEvent {
    pub query: String,
}

/// GTID event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GtidEvent {
    pub flags: u8,
    pub source_id: Uuid,
    pub gno: u64,
}

impl GtidEvent {
    /// `<uuid>:<transaction number>`
    pub fn gtid(&self) -> String {
        format!("{}:{}", self.source_id.hyphenated(), self.gno)
    }
}

/// Table map event - describes table structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMapEvent {
    pub table_id: u64,
    pub flags: u16,
    pub schema_name: String,
    pub table_name: String,
    pub column_types: Vec<ColumnType>,
    pub column_metadata: Vec<u16>,
    pub column_nullability: Bitmap,
}

impl TableMapEvent {
    pub fn column_count(&self) -> usize {
        self.column_types.len()
    }

    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

/// Rows event (INSERT/UPDATE/DELETE)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowsEvent {
    pub table_id: u64,
    pub flags: u16,
    pub column_count: usize,
    /// Columns present in the before image (or the only image for INSERT/DELETE)
    pub columns_before_image: Bitmap,
    /// Columns present in the after image (UPDATE only)
    pub columns_after_image: Option<Bitmap>,
    pub rows: Vec<RowData>,
}

/// Row data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowData {
    /// For UPDATE/DELETE
    pub before: Option<Vec<ColumnValue>>,
    /// For INSERT/UPDATE
    pub after: Option<Vec<ColumnValue>>,
}

/// Fixed-size bit set, least significant bit of the first byte is bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bitmap {
    bits: usize,
    bytes: Vec<u8>,
}

impl Bitmap {
    pub fn from_bytes(bytes: Vec<u8>, bits: usize) -> Self {
        Self { bits, bytes }
    }

    /// All `bits` bits set.
    pub fn full(bits: usize) -> Self {
        let mut bytes = vec![0xFF; bits.div_ceil(8)];
        if bits % 8 != 0 {
            if let Some(last) = bytes.last_mut() {
                *last = (1u8 << (bits % 8)) - 1;
            }
        }
        Self { bits, bytes }
    }

    pub fn len(&self) -> usize {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn is_set(&self, idx: usize) -> bool {
        idx < self.bits
            && self
                .bytes
                .get(idx / 8)
                .is_some_and(|b| b & (1 << (idx % 8)) != 0)
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        (0..self.bits).filter(|i| self.is_set(*i)).count()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// MySQL column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    Varchar,
    Bit,
    Timestamp2,
    DateTime2,
    Time2,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    Unknown(u8),
}

impl ColumnType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ColumnType::Decimal,
            1 => ColumnType::Tiny,
            2 => ColumnType::Short,
            3 => ColumnType::Long,
            4 => ColumnType::Float,
            5 => ColumnType::Double,
            6 => ColumnType::Null,
            7 => ColumnType::Timestamp,
            8 => ColumnType::LongLong,
            9 => ColumnType::Int24,
            10 => ColumnType::Date,
            11 => ColumnType::Time,
            12 => ColumnType::DateTime,
            13 => ColumnType::Year,
            14 => ColumnType::NewDate,
            15 => ColumnType::Varchar,
            16 => ColumnType::Bit,
            17 => ColumnType::Timestamp2,
            18 => ColumnType::DateTime2,
            19 => ColumnType::Time2,
            245 => ColumnType::Json,
            246 => ColumnType::NewDecimal,
            247 => ColumnType::Enum,
            248 => ColumnType::Set,
            249 => ColumnType::TinyBlob,
            250 => ColumnType::MediumBlob,
            251 => ColumnType::LongBlob,
            252 => ColumnType::Blob,
            253 => ColumnType::VarString,
            254 => ColumnType::String,
            255 => ColumnType::Geometry,
            other => ColumnType::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ColumnType::Decimal => 0,
            ColumnType::Tiny => 1,
            ColumnType::Short => 2,
            ColumnType::Long => 3,
            ColumnType::Float => 4,
            ColumnType::Double => 5,
            ColumnType::Null => 6,
            ColumnType::Timestamp => 7,
            ColumnType::LongLong => 8,
            ColumnType::Int24 => 9,
            ColumnType::Date => 10,
            ColumnType::Time => 11,
            ColumnType::DateTime => 12,
            ColumnType::Year => 13,
            ColumnType::NewDate => 14,
            ColumnType::Varchar => 15,
            ColumnType::Bit => 16,
            ColumnType::Timestamp2 => 17,
            ColumnType::DateTime2 => 18,
            ColumnType::Time2 => 19,
            ColumnType::Json => 245,
            ColumnType::NewDecimal => 246,
            ColumnType::Enum => 247,
            ColumnType::Set => 248,
            ColumnType::TinyBlob => 249,
            ColumnType::MediumBlob => 250,
            ColumnType::LongBlob => 251,
            ColumnType::Blob => 252,
            ColumnType::VarString => 253,
            ColumnType::String => 254,
            ColumnType::Geometry => 255,
            ColumnType::Unknown(code) => *code,
        }
    }
}

/// Column value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    SignedInt(i64),
    Float(f32),
    Double(f64),
    /// Exact decimal rendering, e.g. `-1234.5600`
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    Date {
        year: u16,
        month: u8,
        day: u8,
    },
    Time {
        hours: u16,
        minutes: u8,
        seconds: u8,
        microseconds: u32,
        negative: bool,
    },
    DateTime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
    },
    /// Seconds since the unix epoch, with fractional part for TIMESTAMP2
    Timestamp {
        seconds: u32,
        microseconds: u32,
    },
    Year(u16),
    Json(serde_json::Value),
    Enum(u16),
    Set(u64),
    Bit(Bitmap),
}
