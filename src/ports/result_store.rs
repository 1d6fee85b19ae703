use std::time::Duration;

use serde::Serialize;

use crate::domain::criteria::SearchCriteria;
use crate::domain::table::{HotelRecord, ResultTable};

/// A persisted row with its surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRow {
    pub id: u64,
    #[serde(flatten)]
    pub record: HotelRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSearch {
    pub criteria: SearchCriteria,
    pub rows: Vec<StoredRow>,
}

impl StoredSearch {
    pub fn to_table(&self) -> ResultTable {
        ResultTable {
            records: self.rows.iter().map(|r| r.record.clone()).collect(),
        }
    }
}

pub trait ResultStore: Send + Sync {
    /// Truncate the rows of the previous latest search and insert `table`.
    fn replace_latest(&self, criteria: &SearchCriteria, table: &ResultTable) -> StoredSearch;
    /// Make an already stored search the latest one, leaving history untouched.
    fn set_latest(&self, search: StoredSearch);
    fn latest(&self) -> Option<StoredSearch>;
    /// A stored search for identical criteria, no older than `max_age`.
    fn recent(&self, criteria: &SearchCriteria, max_age: Duration) -> Option<StoredSearch>;
}
