use super::column::read_column_value;
use super::{DeserializationContext, EventDataDeserializer};
use crate::error::{BinlogError, Result};
use crate::event::{Bitmap, ColumnValue, EventData, RowData, RowsEvent, TableMapEvent};
use crate::io::BinlogInputStream;

/// Which row images a rows event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowsKind {
    /// INSERT: after image only
    Write,
    /// UPDATE: before and after image
    Update,
    /// DELETE: before image only
    Delete,
}

/// WRITE_ROWS / UPDATE_ROWS / DELETE_ROWS, v1 and v2 ("extended") layouts
///
/// ```text
/// [table_id: 6] [flags: 2] v2: [extra_len: 2] [extra: extra_len - 2]
/// [column_count: packed] [columns: bitmap] update: [columns_after: bitmap]
/// rows...
/// ```
///
/// Column types come from the TABLE_MAP event cached for the table id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsEventDataDeserializer {
    kind: RowsKind,
    extra_information: bool,
}

impl RowsEventDataDeserializer {
    pub fn new(kind: RowsKind) -> Self {
        Self {
            kind,
            extra_information: false,
        }
    }

    pub fn write() -> Self {
        Self::new(RowsKind::Write)
    }

    pub fn update() -> Self {
        Self::new(RowsKind::Update)
    }

    pub fn delete() -> Self {
        Self::new(RowsKind::Delete)
    }

    /// Expect the v2 extra-data block after the flags.
    pub fn with_extra_information(mut self, extra_information: bool) -> Self {
        self.extra_information = extra_information;
        self
    }

    pub fn kind(&self) -> RowsKind {
        self.kind
    }
}

impl EventDataDeserializer for RowsEventDataDeserializer {
    fn deserialize(
        &self,
        input: &mut BinlogInputStream,
        ctx: &DeserializationContext<'_>,
    ) -> Result<EventData> {
        let table_id = input.read_u48_le()?;
        let flags = input.read_u16_le()?;

        if self.extra_information {
            let extra_len = usize::from(input.read_u16_le()?);
            if extra_len < 2 {
                return Err(BinlogError::invalid_format(format!(
                    "rows event extra data length {} < 2",
                    extra_len
                )));
            }
            input.skip(extra_len - 2)?;
        }

        let column_count = input.read_packed_length()?;
        let columns_before_image = input.read_bitmap(column_count)?;
        let columns_after_image = match self.kind {
            RowsKind::Update => Some(input.read_bitmap(column_count)?),
            RowsKind::Write | RowsKind::Delete => None,
        };

        let table = ctx
            .table_maps
            .get(table_id)
            .ok_or(BinlogError::MissingTableMap { table_id })?;
        if column_count > table.column_count() {
            return Err(BinlogError::invalid_format(format!(
                "rows event for {} has {} columns, table map has {}",
                table.qualified_name(),
                column_count,
                table.column_count()
            )));
        }

        let mut rows = Vec::new();
        while input.peek()?.is_some() {
            let row = match self.kind {
                RowsKind::Write => RowData {
                    before: None,
                    after: Some(read_row(input, table, &columns_before_image)?),
                },
                RowsKind::Delete => RowData {
                    before: Some(read_row(input, table, &columns_before_image)?),
                    after: None,
                },
                RowsKind::Update => {
                    let before = read_row(input, table, &columns_before_image)?;
                    let after_columns = columns_after_image
                        .as_ref()
                        .unwrap_or(&columns_before_image);
                    RowData {
                        before: Some(before),
                        after: Some(read_row(input, table, after_columns)?),
                    }
                }
            };
            rows.push(row);
        }

        let event = RowsEvent {
            table_id,
            flags,
            column_count,
            columns_before_image,
            columns_after_image,
            rows,
        };

        Ok(match self.kind {
            RowsKind::Write => EventData::WriteRows(event),
            RowsKind::Update => EventData::UpdateRows(event),
            RowsKind::Delete => EventData::DeleteRows(event),
        })
    }
}

/// One row image: a null bitmap over the included columns, then the
/// non-null values in column order.
fn read_row(
    input: &mut BinlogInputStream,
    table: &TableMapEvent,
    included: &Bitmap,
) -> Result<Vec<ColumnValue>> {
    let nulls = input.read_bitmap(included.count_ones())?;
    let mut values = Vec::with_capacity(nulls.len());

    let mut null_idx = 0;
    for col_idx in (0..included.len()).filter(|i| included.is_set(*i)) {
        if nulls.is_set(null_idx) {
            values.push(ColumnValue::Null);
        } else {
            let column_type = table.column_types[col_idx];
            let meta = table.column_metadata.get(col_idx).copied().unwrap_or(0);
            values.push(read_column_value(input, column_type, meta)?);
        }
        null_idx += 1;
    }

    Ok(values)
}
