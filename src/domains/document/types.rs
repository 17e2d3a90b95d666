use crate::errors::DomainResult;
use crate::query::{Criteria, FromPositionalRow, Predicate, QueryShape, RowReader};
use serde::{Deserialize, Serialize};

/// Equality filters for document searches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCriteria {
    pub user_id: Option<String>,
    pub language: Option<String>,
}

impl DocumentCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Criteria for DocumentCriteria {
    fn shape(&self) -> QueryShape {
        QueryShape::Document
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(user_id) = &self.user_id {
            predicates.push(Predicate::text("d.user_id", "user_id", user_id));
        }
        if let Some(language) = &self.language {
            predicates.push(Predicate::text("d.language", "language", language));
        }
        predicates
    }
}

/// Document listing row with the owner's username
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentDto {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub user_id: String,
    pub username: String,
    pub create_timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_timestamp: Option<i64>,
}

impl FromPositionalRow for DocumentDto {
    const SHAPE: QueryShape = QueryShape::Document;

    fn from_positional_row(reader: &mut RowReader<'_>) -> DomainResult<Self> {
        Ok(Self {
            id: reader.text()?,
            title: reader.text()?,
            language: reader.optional_text()?,
            user_id: reader.text()?,
            username: reader.text()?,
            create_timestamp: reader.timestamp_millis()?,
            update_timestamp: reader.optional_timestamp_millis()?,
        })
    }
}
