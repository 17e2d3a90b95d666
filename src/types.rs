use serde::{Deserialize, Serialize};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::PaginationConfig;

/// Sort specification: a positional column index plus a direction.
///
/// The index is resolved against the column table of whichever query shape
/// is being built, so the same value can mean different columns for
/// different entities. Callers never provide a column name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortCriteria {
    pub column: u32,
    pub asc: bool,
}

impl SortCriteria {
    /// Absent column means index 0, absent direction means ascending.
    pub fn new(column: Option<u32>, asc: Option<bool>) -> Self {
        Self {
            column: column.unwrap_or(0),
            asc: asc.unwrap_or(true),
        }
    }

    pub fn direction_sql(&self) -> &'static str {
        if self.asc { "ASC" } else { "DESC" }
    }
}

impl Default for SortCriteria {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Raw pagination parameters as supplied by the caller
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageRequest {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }

    /// Resolve against configured bounds: a missing or zero limit takes the
    /// default, an oversized limit is clamped to the maximum, a missing
    /// offset is 0.
    pub fn resolve(&self, config: &PaginationConfig) -> (u32, u32) {
        let limit = match self.limit {
            None | Some(0) => config.default_limit,
            Some(requested) if requested > config.max_limit => {
                log::warn!(
                    "Requested page size {} exceeds maximum {}, clamping",
                    requested, config.max_limit
                );
                config.max_limit
            }
            Some(requested) => requested,
        };
        (limit, self.offset.unwrap_or(0))
    }
}

/// One page of results plus the total number of matching rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, limit: u32, offset: u32) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    pub fn has_more(&self) -> bool {
        (self.offset as u64) + (self.items.len() as u64) < self.total
    }
}

/// Storage format for timestamps: fixed-width RFC3339 with nanoseconds, so
/// lexical order is time order and stored values round-trip exactly
pub fn to_db_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Current time truncated to the millisecond precision DTOs expose
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
