// src/domains/activity/types.rs

use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::query::{Criteria, FromPositionalRow, Predicate, QueryShape, RowReader};
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use sqlx::FromRow;

pub const MAX_ACTIVITY_TYPE_LENGTH: usize = 50;
pub const COMPLETE_PROGRESS: i32 = 100;

/// User activity entity - progress a user makes on some piece of work,
/// optionally tied to a document or other entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserActivity {
    pub id: String,
    pub user_id: String,
    pub activity_type: String,
    pub entity_id: Option<String>,
    /// 0-100
    pub progress: i32,
    pub planned_date: Option<DateTime<Utc>>,
    /// Set if and only if progress is 100
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserActivity {
    pub fn is_complete(&self) -> bool {
        self.progress == COMPLETE_PROGRESS
    }
}

/// Input for creating a user activity. ID and creation time are assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserActivity {
    pub user_id: String,
    pub activity_type: String,
    pub entity_id: Option<String>,
    pub progress: i32,
    pub planned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
}

/// Partial update of a user activity.
///
/// `progress` is always written. `planned_date: None` leaves the stored
/// value alone. `completed_date` is `None` to leave it alone, `Some(None)`
/// to clear it and `Some(Some(ts))` to set it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserActivity {
    pub id: String,
    pub progress: i32,
    pub planned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<Option<DateTime<Utc>>>,
}

/// UserActivityRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct UserActivityRow {
    pub id: String,
    pub user_id: String,
    pub activity_type: String,
    pub entity_id: Option<String>,
    pub progress: i64,
    pub planned_date: Option<String>,
    pub completed_date: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl UserActivityRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<UserActivity> {
        let parse_datetime = |s: String, field_name: &str| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| DomainError::Validation(ValidationError::format(field_name, &format!("Invalid RFC3339 format: {}", s))))
        };
        let parse_optional_datetime = |s: Option<String>, field_name: &str| -> DomainResult<Option<DateTime<Utc>>> {
            match s {
                Some(dt_str) => parse_datetime(dt_str, field_name).map(Some),
                None => Ok(None),
            }
        };
        let progress = i32::try_from(self.progress)
            .map_err(|_| DomainError::Validation(ValidationError::range("progress", 0, COMPLETE_PROGRESS)))?;

        Ok(UserActivity {
            id: self.id,
            user_id: self.user_id,
            activity_type: self.activity_type,
            entity_id: self.entity_id,
            progress,
            planned_date: parse_optional_datetime(self.planned_date, "planned_date")?,
            completed_date: parse_optional_datetime(self.completed_date, "completed_date")?,
            created_at: parse_datetime(self.created_at, "created_at")?,
            deleted_at: parse_optional_datetime(self.deleted_at, "deleted_at")?,
        })
    }
}

/// Equality filters for user activity searches; `None` means unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityCriteria {
    pub user_id: Option<String>,
    pub activity_type: Option<String>,
    pub entity_id: Option<String>,
}

impl UserActivityCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_activity_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl Criteria for UserActivityCriteria {
    fn shape(&self) -> QueryShape {
        QueryShape::UserActivity
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(user_id) = &self.user_id {
            predicates.push(Predicate::text("ua.user_id", "user_id", user_id));
        }
        if let Some(activity_type) = &self.activity_type {
            predicates.push(Predicate::text("ua.activity_type", "activity_type", activity_type));
        }
        if let Some(entity_id) = &self.entity_id {
            predicates.push(Predicate::text("ua.entity_id", "entity_id", entity_id));
        }
        predicates
    }
}

// --- Response DTOs ---

/// Flattened search result: the activity with the owner's username and the
/// related document's title. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserActivityDto {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub activity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_date_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date_timestamp: Option<i64>,
    pub create_timestamp: i64,
}

impl FromPositionalRow for UserActivityDto {
    const SHAPE: QueryShape = QueryShape::UserActivity;

    fn from_positional_row(reader: &mut RowReader<'_>) -> DomainResult<Self> {
        let id = reader.text()?;
        let user_id = reader.text()?;
        let username = reader.text()?;
        let activity_type = reader.text()?;
        let entity_id = reader.optional_text()?;
        let entity_name = reader.optional_text()?;
        let progress = reader.small_integer()?;
        let planned_date_timestamp = reader.optional_timestamp_millis()?;
        let completed_date_timestamp = reader.optional_timestamp_millis()?;
        let create_timestamp = reader.timestamp_millis()?;

        Ok(Self {
            id,
            user_id,
            username,
            activity_type,
            entity_id,
            entity_name,
            progress,
            planned_date_timestamp,
            completed_date_timestamp,
            create_timestamp,
        })
    }
}

/// Create-or-update request as received from a caller.
///
/// `id` absent creates a new activity for `user_id`; present updates that
/// activity's progress and planned date. `planned_date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveActivityRequest {
    pub id: Option<String>,
    pub user_id: String,
    pub activity_type: Option<String>,
    pub entity_id: Option<String>,
    pub planned_date: Option<String>,
    pub progress: Option<i32>,
}

impl Validate for SaveActivityRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("activity_type", self.activity_type.clone())
            .required()
            .max_length(MAX_ACTIVITY_TYPE_LENGTH)
            .validate()?;

        ValidationBuilder::new("progress", self.progress)
            .present()
            .range(0, COMPLETE_PROGRESS)
            .validate()?;

        ValidationBuilder::new("user_id", Some(self.user_id.clone()))
            .required()
            .validate()?;

        if let Some(id) = &self.id {
            ValidationBuilder::new("id", Some(id.clone()))
                .required()
                .identifier()
                .validate()?;
        }

        if let Some(planned_date) = &self.planned_date {
            crate::validation::common::parse_date(planned_date, "planned_date")?;
        }

        Ok(())
    }
}
