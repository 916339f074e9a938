//! Binlog event model
//!
//! An [`Event`] is always a complete pair of [`EventHeader`] and
//! [`EventData`]. Records with no registered body decoder carry
//! [`EventData::Empty`].

mod data;
mod header;

pub use data::*;
pub use header::*;

use serde::Serialize;

/// Binlog event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Type code not known to this crate (raw code retained)
    Unknown(u8),
    StartV3,
    Query,
    Stop,
    Rotate,
    Intvar,
    Load,
    Slave,
    CreateFile,
    AppendBlock,
    ExecLoad,
    DeleteFile,
    NewLoad,
    Rand,
    UserVar,
    FormatDescription,
    Xid,
    BeginLoadQuery,
    ExecuteLoadQuery,
    TableMap,
    PreGaWriteRows,
    PreGaUpdateRows,
    PreGaDeleteRows,
    /// WRITE_ROWS_EVENT v1
    WriteRows,
    /// UPDATE_ROWS_EVENT v1
    UpdateRows,
    /// DELETE_ROWS_EVENT v1
    DeleteRows,
    Incident,
    Heartbeat,
    Ignorable,
    RowsQuery,
    /// WRITE_ROWS_EVENT v2 (extra data section)
    ExtWriteRows,
    /// UPDATE_ROWS_EVENT v2 (extra data section)
    ExtUpdateRows,
    /// DELETE_ROWS_EVENT v2 (extra data section)
    ExtDeleteRows,
    Gtid,
    AnonymousGtid,
    PreviousGtids,
    TransactionContext,
    ViewChange,
    XaPrepare,
    PartialUpdateRows,
    TransactionPayload,
}

impl EventType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => EventType::StartV3,
            2 => EventType::Query,
            3 => EventType::Stop,
            4 => EventType::Rotate,
            5 => EventType::Intvar,
            6 => EventType::Load,
            7 => EventType::Slave,
            8 => EventType::CreateFile,
            9 => EventType::AppendBlock,
            10 => EventType::ExecLoad,
            11 => EventType::DeleteFile,
            12 => EventType::NewLoad,
            13 => EventType::Rand,
            14 => EventType::UserVar,
            15 => EventType::FormatDescription,
            16 => EventType::Xid,
            17 => EventType::BeginLoadQuery,
            18 => EventType::ExecuteLoadQuery,
            19 => EventType::TableMap,
            20 => EventType::PreGaWriteRows,
            21 => EventType::PreGaUpdateRows,
            22 => EventType::PreGaDeleteRows,
            23 => EventType::WriteRows,
            24 => EventType::UpdateRows,
            25 => EventType::DeleteRows,
            26 => EventType::Incident,
            27 => EventType::Heartbeat,
            28 => EventType::Ignorable,
            29 => EventType::RowsQuery,
            30 => EventType::ExtWriteRows,
            31 => EventType::ExtUpdateRows,
            32 => EventType::ExtDeleteRows,
            33 => EventType::Gtid,
            34 => EventType::AnonymousGtid,
            35 => EventType::PreviousGtids,
            36 => EventType::TransactionContext,
            37 => EventType::ViewChange,
            38 => EventType::XaPrepare,
            39 => EventType::PartialUpdateRows,
            40 => EventType::TransactionPayload,
            other => EventType::Unknown(other),
        }
    }

    /// Wire type code
    pub fn code(&self) -> u8 {
        match self {
            EventType::Unknown(code) => *code,
            EventType::StartV3 => 1,
            EventType::Query => 2,
            EventType::Stop => 3,
            EventType::Rotate => 4,
            EventType::Intvar => 5,
            EventType::Load => 6,
            EventType::Slave => 7,
            EventType::CreateFile => 8,
            EventType::AppendBlock => 9,
            EventType::ExecLoad => 10,
            EventType::DeleteFile => 11,
            EventType::NewLoad => 12,
            EventType::Rand => 13,
            EventType::UserVar => 14,
            EventType::FormatDescription => 15,
            EventType::Xid => 16,
            EventType::BeginLoadQuery => 17,
            EventType::ExecuteLoadQuery => 18,
            EventType::TableMap => 19,
            EventType::PreGaWriteRows => 20,
            EventType::PreGaUpdateRows => 21,
            EventType::PreGaDeleteRows => 22,
            EventType::WriteRows => 23,
            EventType::UpdateRows => 24,
            EventType::DeleteRows => 25,
            EventType::Incident => 26,
            EventType::Heartbeat => 27,
            EventType::Ignorable => 28,
            EventType::RowsQuery => 29,
            EventType::ExtWriteRows => 30,
            EventType::ExtUpdateRows => 31,
            EventType::ExtDeleteRows => 32,
            EventType::Gtid => 33,
            EventType::AnonymousGtid => 34,
            EventType::PreviousGtids => 35,
            EventType::TransactionContext => 36,
            EventType::ViewChange => 37,
            EventType::XaPrepare => 38,
            EventType::PartialUpdateRows => 39,
            EventType::TransactionPayload => 40,
        }
    }

    pub fn is_row_event(&self) -> bool {
        matches!(
            self,
            EventType::WriteRows
                | EventType::ExtWriteRows
                | EventType::UpdateRows
                | EventType::ExtUpdateRows
                | EventType::DeleteRows
                | EventType::ExtDeleteRows
        )
    }
}

/// One decoded binlog record.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    header: EventHeader,
    data: EventData,
}

impl Event {
    pub fn new(header: EventHeader, data: EventData) -> Self {
        Self { header, data }
    }

    pub fn header(&self) -> &EventHeader {
        &self.header
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn event_type(&self) -> EventType {
        self.header.event_type
    }

    pub fn into_parts(self) -> (EventHeader, EventData) {
        (self.header, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_from_u8() {
        assert_eq!(EventType::from_u8(15), EventType::FormatDescription);
        assert_eq!(EventType::from_u8(19), EventType::TableMap);
        assert_eq!(EventType::from_u8(30), EventType::ExtWriteRows);
        assert_eq!(EventType::from_u8(31), EventType::ExtUpdateRows);
        assert_eq!(EventType::from_u8(32), EventType::ExtDeleteRows);
        assert_eq!(EventType::from_u8(16), EventType::Xid);
        assert_eq!(EventType::from_u8(4), EventType::Rotate);
        assert_eq!(EventType::from_u8(33), EventType::Gtid);
        assert_eq!(EventType::from_u8(0), EventType::Unknown(0));
        assert_eq!(EventType::from_u8(255), EventType::Unknown(255));
    }

    #[test]
    fn test_event_type_code_matches_from_u8() {
        for code in 0..=u8::MAX {
            assert_eq!(EventType::from_u8(code).code(), code);
        }
    }

    #[test]
    fn test_is_row_event() {
        assert!(EventType::ExtWriteRows.is_row_event());
        assert!(EventType::ExtUpdateRows.is_row_event());
        assert!(EventType::ExtDeleteRows.is_row_event());
        assert!(EventType::WriteRows.is_row_event());
        assert!(EventType::UpdateRows.is_row_event());
        assert!(EventType::DeleteRows.is_row_event());
        assert!(!EventType::Query.is_row_event());
        assert!(!EventType::FormatDescription.is_row_event());
        assert!(!EventType::TableMap.is_row_event());
    }
}
