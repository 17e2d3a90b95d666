use sqlx::{query, query_as, Sqlite, SqlitePool, Transaction};
use crate::config::PaginationConfig;
use crate::domains::core::repository::{CriteriaSearch, FindById, SoftDeletable};
use crate::domains::activity::types::{
    NewUserActivity, UpdateUserActivity, UserActivity, UserActivityCriteria, UserActivityDto,
    UserActivityRow,
};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::query::find_page;
use crate::types::{now_millis, to_db_timestamp, PageRequest, PaginatedResult, SortCriteria};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait defining user activity DAO operations
#[async_trait]
pub trait UserActivityDao:
    FindById<UserActivity>
    + SoftDeletable
    + CriteriaSearch<UserActivityCriteria, UserActivityDto>
    + Send
    + Sync
{
    /// Persist a new activity and return its generated ID
    async fn create(&self, new_activity: &NewUserActivity) -> DomainResult<String>;
    async fn create_with_tx<'t>(
        &self,
        new_activity: &NewUserActivity,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<String>;

    /// Apply a partial update. `Ok(None)` when no live activity has that ID.
    async fn update(&self, update_data: &UpdateUserActivity) -> DomainResult<Option<UserActivity>>;
    async fn update_with_tx<'t>(
        &self,
        update_data: &UpdateUserActivity,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Option<UserActivity>>;

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<UserActivity>> {
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.soft_delete(id).await
    }
}

/// SQLite implementation for UserActivityDao
#[derive(Debug, Clone)]
pub struct SqliteUserActivityDao {
    pool: SqlitePool,
    pagination: PaginationConfig,
}

impl SqliteUserActivityDao {
    pub fn new(pool: SqlitePool, pagination: PaginationConfig) -> Self {
        Self { pool, pagination }
    }

    fn map_row_to_entity(row: UserActivityRow) -> DomainResult<UserActivity> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }
}

#[async_trait]
impl FindById<UserActivity> for SqliteUserActivityDao {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserActivity>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.find_by_id_with_tx(id, &mut tx).await {
            Ok(activity) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(activity)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn find_by_id_with_tx(
        &self,
        id: &str,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<Option<UserActivity>> {
        let row = query_as::<_, UserActivityRow>(
            "SELECT * FROM user_activities WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DbError::from)?;

        row.map(Self::map_row_to_entity).transpose()
    }
}

#[async_trait]
impl SoftDeletable for SqliteUserActivityDao {
    async fn soft_delete_with_tx(
        &self,
        id: &str,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now = to_db_timestamp(&now_millis());

        // The first delete wins; later ones leave the original timestamp untouched
        let result = query(
            "UPDATE user_activities SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL"
        )
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            log::debug!("Soft delete of user activity {} changed nothing", id);
        } else {
            log::info!("Soft deleted user activity {}", id);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &str) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.soft_delete_with_tx(id, &mut tx).await {
            Ok(()) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl CriteriaSearch<UserActivityCriteria, UserActivityDto> for SqliteUserActivityDao {
    async fn find_by_criteria(
        &self,
        criteria: &UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<UserActivityDto>> {
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
        criteria: &UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<PaginatedResult<UserActivityDto>> {
        find_page(&mut **tx, &self.pagination, criteria, sort, page).await
    }
}

#[async_trait]
impl UserActivityDao for SqliteUserActivityDao {
    async fn create(&self, new_activity: &NewUserActivity) -> DomainResult<String> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.create_with_tx(new_activity, &mut tx).await {
            Ok(id) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(id)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn create_with_tx<'t>(
        &self,
        new_activity: &NewUserActivity,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<String> {
        let id = Uuid::new_v4().to_string();
        let now_str = to_db_timestamp(&now_millis());

        query(
            r#"
            INSERT INTO user_activities (
                id, user_id, activity_type, entity_id, progress,
                planned_date, completed_date, created_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&id)
        .bind(&new_activity.user_id)
        .bind(&new_activity.activity_type)
        .bind(&new_activity.entity_id)
        .bind(new_activity.progress)
        .bind(new_activity.planned_date.as_ref().map(to_db_timestamp))
        .bind(new_activity.completed_date.as_ref().map(to_db_timestamp))
        .bind(&now_str)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        log::debug!("Created user activity {} for user {}", id, new_activity.user_id);
        Ok(id)
    }

    async fn update(&self, update_data: &UpdateUserActivity) -> DomainResult<Option<UserActivity>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.update_with_tx(update_data, &mut tx).await {
            Ok(activity) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(activity)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn update_with_tx<'t>(
        &self,
        update_data: &UpdateUserActivity,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Option<UserActivity>> {
        let current = match self.find_by_id_with_tx(&update_data.id, tx).await? {
            Some(activity) => activity,
            None => return Ok(None),
        };

        let planned_date = update_data.planned_date.or(current.planned_date);
        let completed_date = match update_data.completed_date {
            Some(change) => change,
            None => current.completed_date,
        };

        query(
            "UPDATE user_activities SET progress = ?, planned_date = ?, completed_date = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(update_data.progress)
        .bind(planned_date.as_ref().map(to_db_timestamp))
        .bind(completed_date.as_ref().map(to_db_timestamp))
        .bind(&update_data.id)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        self.find_by_id_with_tx(&update_data.id, tx).await
    }
}
