use std::fmt;

use sqlx::sqlite::SqliteRow;
use sqlx::{Arguments, SqliteConnection};

use crate::config::PaginationConfig;
use crate::errors::{DbError, DomainError, DomainResult};
use crate::query::builder::{Criteria, CriteriaQueryBuilder, QueryParam};
use crate::query::row_mapper::{map_rows, FromPositionalRow};
use crate::types::{PageRequest, PaginatedResult, SortCriteria};

/// Rows of one window plus the total number of matching rows
pub struct RawPage {
    pub rows: Vec<SqliteRow>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

// SqliteRow has no Debug impl
impl fmt::Debug for RawPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPage")
            .field("rows", &self.rows.len())
            .field("total", &self.total)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl RawPage {
    pub fn map_into<T: FromPositionalRow>(self) -> DomainResult<PaginatedResult<T>> {
        let items = map_rows::<T>(&self.rows)?;
        Ok(PaginatedResult::new(items, self.total, self.limit, self.offset))
    }
}

pub fn count_sql(query: &QueryParam) -> String {
    format!("SELECT COUNT(*) FROM ({}) AS counted", query.filtered_sql())
}

pub fn window_sql(query: &QueryParam) -> String {
    format!("{} LIMIT ? OFFSET ?", query.sorted_sql())
}

/// Runs the count variant and the windowed variant of `query` on `conn`.
///
/// The total comes from the count query, never from the page size.
pub async fn execute_paginated_query(
    conn: &mut SqliteConnection,
    query: &QueryParam,
    limit: u32,
    offset: u32,
) -> DomainResult<RawPage> {
    let count_sql = count_sql(query);
    let total: i64 = sqlx::query_scalar_with(&count_sql, query.arguments()?)
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::from)?;

    let window_sql = window_sql(query);
    let mut args = query.arguments()?;
    args.add(limit as i64)
        .and_then(|_| args.add(offset as i64))
        .map_err(|e| DomainError::Internal(format!("Failed to bind window: {}", e)))?;

    let rows = sqlx::query_with(&window_sql, args)
        .fetch_all(&mut *conn)
        .await
        .map_err(DbError::from)?;

    log::debug!(
        "{} query returned {} of {} rows (limit {}, offset {})",
        query.shape().name(),
        rows.len(),
        total,
        limit,
        offset
    );

    Ok(RawPage {
        rows,
        total: total.max(0) as u64,
        limit,
        offset,
    })
}

/// Builds, executes and maps a criteria search in one go
pub async fn find_page<C, T>(
    conn: &mut SqliteConnection,
    pagination: &PaginationConfig,
    criteria: &C,
    sort: SortCriteria,
    page: PageRequest,
) -> DomainResult<PaginatedResult<T>>
where
    C: Criteria + ?Sized,
    T: FromPositionalRow,
{
    let query = CriteriaQueryBuilder::new(T::SHAPE)
        .filter(criteria)?
        .sort(sort)
        .build();
    let (limit, offset) = page.resolve(pagination);
    execute_paginated_query(conn, &query, limit, offset)
        .await?
        .map_into::<T>()
}
