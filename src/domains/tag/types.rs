use crate::errors::DomainResult;
use crate::query::{Criteria, FromPositionalRow, Predicate, QueryShape, RowReader};
use serde::{Deserialize, Serialize};

/// Equality filters for tag searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCriteria {
    pub user_id: Option<String>,
    pub name: Option<String>,
}

impl TagCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Criteria for TagCriteria {
    fn shape(&self) -> QueryShape {
        QueryShape::Tag
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(user_id) = &self.user_id {
            predicates.push(Predicate::text("t.user_id", "user_id", user_id));
        }
        if let Some(name) = &self.name {
            predicates.push(Predicate::text("t.name", "name", name));
        }
        predicates
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub user_id: String,
    pub username: String,
    pub create_timestamp: i64,
}

impl FromPositionalRow for TagDto {
    const SHAPE: QueryShape = QueryShape::Tag;

    fn from_positional_row(reader: &mut RowReader<'_>) -> DomainResult<Self> {
        Ok(Self {
            id: reader.text()?,
            name: reader.text()?,
            color: reader.text()?,
            user_id: reader.text()?,
            username: reader.text()?,
            create_timestamp: reader.timestamp_millis()?,
        })
    }
}
