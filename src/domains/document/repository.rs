use crate::config::PaginationConfig;
use crate::domains::core::repository::CriteriaSearch;
use crate::domains::document::types::{DocumentCriteria, DocumentDto};
use crate::errors::{DbError, DomainResult};
use crate::query::find_page;
use crate::types::{PageRequest, PaginatedResult, SortCriteria};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Read-only document searches
pub trait DocumentDao: CriteriaSearch<DocumentCriteria, DocumentDto> + Send + Sync {}

/// SQLite implementation for DocumentDao
#[derive(Debug, Clone)]
pub struct SqliteDocumentDao {
    pool: SqlitePool,
    pagination: PaginationConfig,
}

impl SqliteDocumentDao {
    pub fn new(pool: SqlitePool, pagination: PaginationConfig) -> Self {
        Self { pool, pagination }
    }
}

#[async_trait]
impl CriteriaSearch<DocumentCriteria, DocumentDto> for SqliteDocumentDao {
    async fn find_by_criteria(
        &self,
        criteria: &DocumentCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<DocumentDto>> {
        // Count and window read the same snapshot
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.find_by_criteria_with_tx(criteria, sort, page, &mut tx).await {
            Ok(page) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(page)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn find_by_criteria_with_tx(
        &self,
        criteria: &DocumentCriteria,
        sort: SortCriteria,
        page: PageRequest,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<PaginatedResult<DocumentDto>> {
        find_page(&mut **tx, &self.pagination, criteria, sort, page).await
    }
}

impl DocumentDao for SqliteDocumentDao {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_document, insert_user, migrated_pool, soft_delete_row};

    async fn setup() -> SqliteDocumentDao {
        let pool = migrated_pool().await;
        insert_user(&pool, "u1", "alice").await;
        insert_user(&pool, "u2", "bob").await;
        insert_document(&pool, "d1", "u1", "Budget", Some("eng"), "2024-02-01T00:00:00.000Z").await;
        insert_document(&pool, "d2", "u1", "Agenda", Some("fra"), "2024-02-03T00:00:00.000Z").await;
        insert_document(&pool, "d3", "u2", "Minutes", Some("eng"), "2024-02-02T00:00:00.000Z").await;
        insert_document(&pool, "d4", "u2", "Draft", None, "2024-02-04T00:00:00.000Z").await;
        soft_delete_row(&pool, "documents", "d4").await;
        SqliteDocumentDao::new(pool, PaginationConfig::default())
    }

    #[tokio::test]
    async fn test_default_sort_is_creation_date() {
        let dao = setup().await;
        let page = dao
            .find_by_criteria(&DocumentCriteria::new(), SortCriteria::new(Some(42), None), PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<&str> = page.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d3", "d2"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_filters_and_title_sort() {
        let dao = setup().await;
        let criteria = DocumentCriteria::new().with_user_id("u1");
        let page = dao
            .find_by_criteria(&criteria, SortCriteria::new(Some(1), Some(true)), PageRequest::default())
            .await
            .unwrap();
        let titles: Vec<&str> = page.items.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Agenda", "Budget"]);
        assert_eq!(page.items[0].username, "alice");
        assert_eq!(page.items[0].update_timestamp, None);

        let english = dao
            .find_by_criteria(&DocumentCriteria::new().with_language("eng"), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(english.total, 2);
    }

    #[tokio::test]
    async fn test_window_past_the_end_keeps_total() {
        let dao = setup().await;
        let page = dao
            .find_by_criteria(&DocumentCriteria::new(), SortCriteria::default(), PageRequest::new(Some(2), Some(10)))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}
