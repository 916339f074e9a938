//! Table map cache
//!
//! Rows events only carry a table id; the column layout comes from the most
//! recent TABLE_MAP event for that id. Entries are never evicted: the number
//! of distinct tables on a stream is expected to stay small.

use crate::event::TableMapEvent;
use std::collections::HashMap;

/// Table map cache (table_id -> TableMapEvent), last writer wins
#[derive(Debug, Clone, Default)]
pub struct TableMapCache {
    tables: HashMap<u64, TableMapEvent>,
}

impl TableMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get table info from cache
    pub fn get(&self, table_id: u64) -> Option<&TableMapEvent> {
        self.tables.get(&table_id)
    }

    pub fn contains(&self, table_id: u64) -> bool {
        self.tables.contains_key(&table_id)
    }

    /// Store `table_map` under its table id, returning the entry it replaced.
    pub fn insert(&mut self, table_map: TableMapEvent) -> Option<TableMapEvent> {
        self.tables.insert(table_map.table_id, table_map)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &TableMapEvent)> {
        self.tables.iter()
    }
}
