use crate::domains::activity::repository::UserActivityDao;
use crate::domains::activity::types::{
    NewUserActivity, SaveActivityRequest, UpdateUserActivity, UserActivity, UserActivityCriteria,
    UserActivityDto, COMPLETE_PROGRESS,
};
use crate::errors::{DbError, DomainError, DomainResult, ValidationError};
use crate::types::{now_millis, PageRequest, PaginatedResult, SortCriteria};
use crate::validation::{common, Validate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

/// Trait defining user activity service operations
#[async_trait]
pub trait UserActivityService: Send + Sync {
    /// Create (no `id`) or update (with `id`) an activity, returning its ID
    async fn save(&self, request: SaveActivityRequest) -> DomainResult<String>;

    /// Listing across all users, filtered by user and type only
    async fn list_all(
        &self,
        filter: UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<UserActivityDto>>;

    /// Listing constrained to one user, filtered by type and entity
    async fn list_for_user(
        &self,
        user_id: &str,
        filter: UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<UserActivityDto>>;

    async fn get(&self, id: &str) -> DomainResult<Option<UserActivity>>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

/// Implementation of the user activity service
#[derive(Clone)]
pub struct UserActivityServiceImpl {
    pool: SqlitePool,
    dao: Arc<dyn UserActivityDao>,
}

impl UserActivityServiceImpl {
    pub fn new(pool: SqlitePool, dao: Arc<dyn UserActivityDao>) -> Self {
        Self { pool, dao }
    }

    fn parse_planned_date(planned_date: Option<&str>) -> DomainResult<Option<DateTime<Utc>>> {
        let Some(raw) = planned_date else {
            return Ok(None);
        };
        let date = common::parse_date(raw, "planned_date")?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            DomainError::Validation(ValidationError::format("planned_date", "not a valid day"))
        })?;
        Ok(Some(midnight.and_utc()))
    }

    async fn create_activity(
        &self,
        request: SaveActivityRequest,
        progress: i32,
        planned_date: Option<DateTime<Utc>>,
    ) -> DomainResult<String> {
        let new_activity = NewUserActivity {
            user_id: request.user_id,
            activity_type: request.activity_type.unwrap_or_default(),
            entity_id: request.entity_id,
            progress,
            planned_date,
            completed_date: (progress == COMPLETE_PROGRESS).then(now_millis),
        };
        let id = self.dao.create(&new_activity).await?;
        log::info!("Created user activity {} ({}% complete)", id, progress);
        Ok(id)
    }

    async fn update_activity(
        &self,
        id: String,
        progress: i32,
        planned_date: Option<DateTime<Utc>>,
    ) -> DomainResult<String> {
        // The completion decision and the write share one unit of work
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.update_activity_with_tx(&id, progress, planned_date, &mut tx).await {
            Ok(()) => {
                tx.commit().await.map_err(DbError::from)?;
                log::info!("Updated user activity {} ({}% complete)", id, progress);
                Ok(id)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn update_activity_with_tx(
        &self,
        id: &str,
        progress: i32,
        planned_date: Option<DateTime<Utc>>,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let not_found = || DomainError::EntityNotFound("UserActivity".to_string(), id.to_string());
        let existing = self.dao.find_by_id_with_tx(id, tx).await?.ok_or_else(not_found)?;

        let completed_date = if progress != COMPLETE_PROGRESS {
            Some(None)
        } else if existing.completed_date.is_some() {
            None
        } else {
            Some(Some(now_millis()))
        };

        let update = UpdateUserActivity {
            id: id.to_string(),
            progress,
            planned_date,
            completed_date,
        };
        self.dao.update_with_tx(&update, tx).await?.ok_or_else(not_found)?;
        Ok(())
    }
}

#[async_trait]
impl UserActivityService for UserActivityServiceImpl {
    async fn save(&self, request: SaveActivityRequest) -> DomainResult<String> {
        request.validate()?;

        let progress = request
            .progress
            .ok_or_else(|| DomainError::Validation(ValidationError::required("progress")))?;
        let planned_date = Self::parse_planned_date(request.planned_date.as_deref())?;

        match request.id.clone() {
            Some(id) => self.update_activity(id, progress, planned_date).await,
            None => self.create_activity(request, progress, planned_date).await,
        }
    }

    async fn list_all(
        &self,
        filter: UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<UserActivityDto>> {
        let criteria = UserActivityCriteria {
            user_id: filter.user_id,
            activity_type: filter.activity_type,
            entity_id: None,
        };
        self.dao.find_by_criteria(&criteria, sort, page).await
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: UserActivityCriteria,
        sort: SortCriteria,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<UserActivityDto>> {
        let criteria = UserActivityCriteria {
            user_id: Some(user_id.to_string()),
            ..filter
        };
        self.dao.find_by_criteria(&criteria, sort, page).await
    }

    async fn get(&self, id: &str) -> DomainResult<Option<UserActivity>> {
        self.dao.get_by_id(id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.dao.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::domains::activity::repository::SqliteUserActivityDao;
    use crate::test_support::{insert_user, migrated_pool};

    async fn service() -> UserActivityServiceImpl {
        let pool = migrated_pool().await;
        insert_user(&pool, "u1", "alice").await;
        insert_user(&pool, "u2", "bob").await;
        let dao = SqliteUserActivityDao::new(pool.clone(), PaginationConfig::default());
        UserActivityServiceImpl::new(pool, Arc::new(dao))
    }

    fn request(user_id: &str, progress: i32) -> SaveActivityRequest {
        SaveActivityRequest {
            id: None,
            user_id: user_id.to_string(),
            activity_type: Some("review".to_string()),
            entity_id: None,
            planned_date: None,
            progress: Some(progress),
        }
    }

    #[tokio::test]
    async fn test_create_sets_completion_only_when_done() {
        let service = service().await;

        let open = service.save(request("u1", 30)).await.unwrap();
        let done = service.save(request("u1", 100)).await.unwrap();

        let open = service.get(&open).await.unwrap().unwrap();
        assert!(open.completed_date.is_none());
        let done = service.get(&done).await.unwrap().unwrap();
        assert!(done.is_complete());
        assert!(done.completed_date.is_some());
    }

    #[tokio::test]
    async fn test_progress_transitions_drive_completed_date() {
        let service = service().await;
        let mut save = request("u1", 40);
        save.planned_date = Some("2024-05-01".to_string());
        let id = service.save(save).await.unwrap();

        let mut finish = request("u1", 100);
        finish.id = Some(id.clone());
        service.save(finish.clone()).await.unwrap();
        let finished = service.get(&id).await.unwrap().unwrap();
        let completed_at = finished.completed_date.expect("completion recorded");
        assert_eq!(
            finished.planned_date.map(|d| d.timestamp_millis()),
            Some(1_714_521_600_000)
        );

        // Saving 100 again keeps the first completion time
        service.save(finish).await.unwrap();
        let again = service.get(&id).await.unwrap().unwrap();
        assert_eq!(again.completed_date, Some(completed_at));

        let mut reopen = request("u1", 80);
        reopen.id = Some(id.clone());
        service.save(reopen).await.unwrap();
        let reopened = service.get(&id).await.unwrap().unwrap();
        assert_eq!(reopened.progress, 80);
        assert!(reopened.completed_date.is_none());
    }

    #[tokio::test]
    async fn test_review_lifecycle_through_search() {
        let service = service().await;
        let by_u1 = || UserActivityCriteria::new().with_user_id("u1");

        let id = service.save(request("u1", 40)).await.unwrap();
        let page = service
            .list_all(by_u1(), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].progress, 40);
        assert_eq!(page.items[0].completed_date_timestamp, None);

        let mut finish = request("u1", 100);
        finish.id = Some(id.clone());
        service.save(finish).await.unwrap();
        let fetched = service.get(&id).await.unwrap().unwrap();
        assert!(fetched.completed_date.is_some());

        service.delete(&id).await.unwrap();
        let page = service
            .list_all(by_u1(), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_untouched() {
        let service = service().await;
        let id = service.save(request("u1", 40)).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER block_updates BEFORE UPDATE ON user_activities \
             BEGIN SELECT RAISE(ABORT, 'updates blocked'); END",
        )
        .execute(&service.pool)
        .await
        .unwrap();

        let mut finish = request("u1", 100);
        finish.id = Some(id.clone());
        let result = service.save(finish).await;
        assert!(matches!(result, Err(DomainError::Database(_))));

        let stored = service.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 40);
        assert!(stored.completed_date.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let service = service().await;
        let mut save = request("u1", 10);
        save.id = Some("no-such-activity".to_string());
        let result = service.save(save).await;
        assert!(matches!(result, Err(DomainError::EntityNotFound(_, _))));
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_storage() {
        let service = service().await;
        let mut save = request("u1", 10);
        save.activity_type = Some("x".repeat(51));
        assert!(matches!(service.save(save).await, Err(DomainError::Validation(_))));

        let total = service
            .list_all(UserActivityCriteria::new(), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap()
            .total;
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_list_for_user_cannot_escape_user() {
        let service = service().await;
        service.save(request("u1", 10)).await.unwrap();
        service.save(request("u2", 20)).await.unwrap();

        let page = service
            .list_for_user(
                "u1",
                UserActivityCriteria::new().with_user_id("u2"),
                SortCriteria::default(),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].username, "alice");

        let all = service
            .list_all(UserActivityCriteria::new(), SortCriteria::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let service = service().await;
        let id = service.save(request("u1", 10)).await.unwrap();
        service.delete(&id).await.unwrap();
        service.delete(&id).await.unwrap();
        assert!(service.get(&id).await.unwrap().is_none());
    }
}
