use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

use crate::errors::{DomainError, DomainResult};
use crate::query::shape::QueryShape;
use crate::types::SortCriteria;

/// A value bound to a query placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

/// Equality predicate contributed by a criteria field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub param: &'static str,
    pub value: SqlValue,
}

impl Predicate {
    pub fn text(column: &'static str, param: &'static str, value: &str) -> Self {
        Self {
            column,
            param,
            value: SqlValue::Text(value.to_string()),
        }
    }
}

/// Filter object for one query shape.
///
/// Implementations return one predicate per field that is set; unset fields
/// place no constraint on the query.
pub trait Criteria {
    fn shape(&self) -> QueryShape;
    fn predicates(&self) -> Vec<Predicate>;
}

/// A built query: SQL text with `?` placeholders, the named values bound to
/// them in placeholder order, and the ORDER BY clause resolved for its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    shape: QueryShape,
    filtered_sql: String,
    order_by: Option<String>,
    params: Vec<(&'static str, SqlValue)>,
}

impl QueryParam {
    pub fn shape(&self) -> QueryShape {
        self.shape
    }

    /// SELECT with WHERE, no ordering or window
    pub fn filtered_sql(&self) -> &str {
        &self.filtered_sql
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn params(&self) -> &[(&'static str, SqlValue)] {
        &self.params
    }

    pub fn param_names(&self) -> Vec<&'static str> {
        self.params.iter().map(|(name, _)| *name).collect()
    }

    /// Full sorted statement, without LIMIT/OFFSET
    pub fn sorted_sql(&self) -> String {
        match &self.order_by {
            Some(order_by) => format!("{} {}", self.filtered_sql, order_by),
            None => self.filtered_sql.clone(),
        }
    }

    /// Fresh argument list for one execution of this query
    pub fn arguments<'q>(&self) -> DomainResult<SqliteArguments<'q>> {
        let mut args = SqliteArguments::default();
        for (name, value) in &self.params {
            let added = match value {
                SqlValue::Text(text) => args.add(text.clone()),
                SqlValue::Integer(number) => args.add(*number),
            };
            added.map_err(|e| {
                DomainError::Internal(format!("Failed to bind parameter '{}': {}", name, e))
            })?;
        }
        Ok(args)
    }
}

/// Composes the criteria search statement for one query shape.
#[derive(Debug)]
pub struct CriteriaQueryBuilder {
    shape: QueryShape,
    predicates: Vec<String>,
    params: Vec<(&'static str, SqlValue)>,
    sort: Option<SortCriteria>,
}

impl CriteriaQueryBuilder {
    /// Starts from the shape's base SELECT with the soft-delete predicate already applied
    pub fn new(shape: QueryShape) -> Self {
        Self {
            shape,
            predicates: vec![shape.not_deleted_predicate().to_string()],
            params: Vec::new(),
            sort: None,
        }
    }

    /// Adds the set fields of `criteria` as bound equality predicates.
    ///
    /// Criteria built for another shape reference columns that do not
    /// exist in this one, so that is rejected.
    pub fn filter<C: Criteria + ?Sized>(mut self, criteria: &C) -> DomainResult<Self> {
        if criteria.shape() != self.shape {
            return Err(DomainError::Internal(format!(
                "Criteria for {} queries cannot filter {} queries",
                criteria.shape().name(),
                self.shape.name()
            )));
        }
        for predicate in criteria.predicates() {
            self.predicates.push(format!("{} = ?", predicate.column));
            self.params.push((predicate.param, predicate.value));
        }
        Ok(self)
    }

    pub fn sort(mut self, sort: SortCriteria) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn build(self) -> QueryParam {
        let mut sql = self.shape.base_query();
        sql.push_str(&where_clause(&self.predicates));

        let order_by = self.sort.map(|sort| {
            format!(
                "ORDER BY {} {}",
                self.shape.resolve_sort_column(sort.column),
                sort.direction_sql()
            )
        });

        log::debug!(
            "Built {} query: {} {} (params: {:?})",
            self.shape.name(),
            sql,
            order_by.as_deref().unwrap_or(""),
            self.params.iter().map(|(name, _)| *name).collect::<Vec<_>>()
        );

        QueryParam {
            shape: self.shape,
            filtered_sql: sql,
            order_by,
            params: self.params,
        }
    }
}

/// ` WHERE a AND b`, or nothing at all when there are no predicates
fn where_clause(predicates: &[String]) -> String {
    if predicates.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", predicates.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ActivityFilter {
        user_id: Option<&'static str>,
        activity_type: Option<&'static str>,
    }

    impl Criteria for ActivityFilter {
        fn shape(&self) -> QueryShape {
            QueryShape::UserActivity
        }

        fn predicates(&self) -> Vec<Predicate> {
            let mut predicates = Vec::new();
            if let Some(user_id) = self.user_id {
                predicates.push(Predicate::text("ua.user_id", "user_id", user_id));
            }
            if let Some(activity_type) = self.activity_type {
                predicates.push(Predicate::text("ua.activity_type", "activity_type", activity_type));
            }
            predicates
        }
    }

    #[test]
    fn test_empty_criteria_only_filters_deleted() {
        let filter = ActivityFilter { user_id: None, activity_type: None };
        let query = CriteriaQueryBuilder::new(QueryShape::UserActivity)
            .filter(&filter)
            .unwrap()
            .build();

        assert!(query.filtered_sql().ends_with(" WHERE ua.deleted_at IS NULL"));
        assert!(query.params().is_empty());
        assert_eq!(query.order_by(), None);
    }

    #[test]
    fn test_values_are_bound_not_interpolated() {
        let hostile = "x' OR '1'='1";
        let filter = ActivityFilter { user_id: Some(hostile), activity_type: Some("review") };
        let query = CriteriaQueryBuilder::new(QueryShape::UserActivity)
            .filter(&filter)
            .unwrap()
            .build();

        assert!(!query.filtered_sql().contains(hostile));
        assert!(!query.filtered_sql().contains("review"));
        assert!(query
            .filtered_sql()
            .ends_with(" WHERE ua.deleted_at IS NULL AND ua.user_id = ? AND ua.activity_type = ?"));
        assert_eq!(query.param_names(), vec!["user_id", "activity_type"]);
        assert_eq!(query.params()[0].1, SqlValue::Text(hostile.to_string()));
        assert!(query.arguments().is_ok());
    }

    #[test]
    fn test_order_by_uses_shape_table() {
        let query = CriteriaQueryBuilder::new(QueryShape::UserActivity)
            .sort(SortCriteria::new(Some(6), Some(false)))
            .build();
        assert_eq!(query.order_by(), Some("ORDER BY ua.progress DESC"));
        assert!(query.sorted_sql().ends_with("WHERE ua.deleted_at IS NULL ORDER BY ua.progress DESC"));

        let query = CriteriaQueryBuilder::new(QueryShape::Document)
            .sort(SortCriteria::new(Some(6), Some(true)))
            .build();
        assert_eq!(query.order_by(), Some("ORDER BY d.created_at ASC"));

        let query = CriteriaQueryBuilder::new(QueryShape::Tag)
            .sort(SortCriteria::new(Some(42), None))
            .build();
        assert_eq!(query.order_by(), Some("ORDER BY t.name ASC"));
        assert!(query.filtered_sql().ends_with(" WHERE t.deleted_at IS NULL"));
    }

    #[test]
    fn test_criteria_for_other_shape_is_rejected() {
        let filter = ActivityFilter { user_id: Some("u1"), activity_type: None };
        let result = CriteriaQueryBuilder::new(QueryShape::Tag).filter(&filter);
        assert!(matches!(result, Err(DomainError::Internal(_))));
    }

    #[test]
    fn test_where_clause_omitted_without_predicates() {
        assert_eq!(where_clause(&[]), "");
        assert_eq!(
            where_clause(&["a = ?".to_string(), "b = ?".to_string()]),
            " WHERE a = ? AND b = ?"
        );
    }
}
