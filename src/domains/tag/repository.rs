use crate::config::PaginationConfig;
use crate::domains::core::repository::CriteriaSearch;
use crate::domains::tag::types::{TagCriteria, TagDto};
use crate::errors::{DbError, DomainResult};
use crate::query::find_page;
use crate::types::{PageRequest, PaginatedResult, SortCriteria};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Read-only tag searches
pub trait TagDao: CriteriaSearch<TagCriteria, TagDto> + Send + Sync {}

#[derive(Debug, Clone)]
pub struct SqliteTagDao {
    pool: SqlitePool,
    pagination: PaginationConfig,
}

impl SqliteTagDao {
    pub fn new(pool: SqlitePool, pagination: PaginationConfig) -> Self {
        Self { pool, pagination }
    }
}

#[async_trait]
impl CriteriaSearch<TagCriteria, TagDto> for SqliteTagDao {
    async fn find_by_criteria(
        &self,
        criteria: &TagCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<TagDto>> {
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
        criteria: &TagCriteria,
        sort: SortCriteria,
        page: PageRequest,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<PaginatedResult<TagDto>> {
        find_page(&mut **tx, &self.pagination, criteria, sort, page).await
    }
}

impl TagDao for SqliteTagDao {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_tag, insert_user, migrated_pool, soft_delete_row};

    async fn setup() -> SqliteTagDao {
        let pool = migrated_pool().await;
        insert_user(&pool, "u1", "alice").await;
        insert_user(&pool, "u2", "bob").await;
        insert_tag(&pool, "t1", "u1", "work", "0000ff", "2024-01-10T00:00:00.000Z").await;
        insert_tag(&pool, "t2", "u1", "archive", "808080", "2024-01-11T00:00:00.000Z").await;
        insert_tag(&pool, "t3", "u2", "work", "00ff00", "2024-01-12T00:00:00.000Z").await;
        insert_tag(&pool, "t4", "u2", "old", "000000", "2024-01-13T00:00:00.000Z").await;
        soft_delete_row(&pool, "tags", "t4").await;
        SqliteTagDao::new(pool, PaginationConfig::default())
    }

    #[tokio::test]
    async fn test_default_sort_is_name() {
        let dao = setup().await;
        let page = dao
            .find_by_criteria(&TagCriteria::new().with_user_id("u1"), SortCriteria::new(Some(17), Some(true)), PageRequest::default())
            .await
            .unwrap();
        let names: Vec<&str> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["archive", "work"]);
    }

    #[tokio::test]
    async fn test_name_filter_spans_users_and_skips_deleted() {
        let dao = setup().await;
        let page = dao
            .find_by_criteria(&TagCriteria::new().with_name("work"), SortCriteria::new(Some(3), Some(false)), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        let owners: Vec<&str> = page.items.iter().map(|t| t.username.as_str()).collect();
        assert_eq!(owners, vec!["bob", "alice"]);

        let old = dao
            .find_by_criteria(&TagCriteria::new().with_name("old"), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(old.total, 0);
    }

    #[tokio::test]
    async fn test_search_sees_uncommitted_rows_in_same_transaction() {
        let dao = setup().await;
        let mut tx = dao.pool.begin().await.unwrap();
        sqlx::query("INSERT INTO tags (id, user_id, name, color, created_at) VALUES ('t5', 'u1', 'draft', 'ffffff', '2024-01-14T00:00:00.000Z')")
            .execute(&mut *tx)
            .await
            .unwrap();

        let inside = dao
            .find_by_criteria_with_tx(&TagCriteria::new().with_user_id("u1"), SortCriteria::default(), PageRequest::default(), &mut tx)
            .await
            .unwrap();
        assert_eq!(inside.total, 3);
        tx.rollback().await.unwrap();

        let after = dao
            .find_by_criteria(&TagCriteria::new().with_user_id("u1"), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(after.total, 2);
    }
}
