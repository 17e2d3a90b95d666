use serde::Serialize;

/// One entry of a shape's SELECT list: the table-qualified expression and
/// the alias the row mapper expects at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectColumn {
    pub expr: &'static str,
    pub alias: &'static str,
}

const fn col(expr: &'static str, alias: &'static str) -> SelectColumn {
    SelectColumn { expr, alias }
}

/// The query shapes the criteria builder knows how to produce.
///
/// A shape is chosen when a query is built and travels with it, so the sort
/// column is always resolved from the shape's own table and never from the
/// generated SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryShape {
    UserActivity,
    Document,
    Tag,
}

const USER_ACTIVITY_COLUMNS: &[SelectColumn] = &[
    col("ua.id", "id"),
    col("ua.user_id", "user_id"),
    col("u.username", "username"),
    col("ua.activity_type", "activity_type"),
    col("ua.entity_id", "entity_id"),
    col("d.title", "entity_name"),
    col("ua.progress", "progress"),
    col("ua.planned_date", "planned_date"),
    col("ua.completed_date", "completed_date"),
    col("ua.created_at", "created_at"),
];

const USER_ACTIVITY_SORT: &[&str] = &[
    "ua.id",
    "ua.user_id",
    "u.username",
    "ua.activity_type",
    "ua.entity_id",
    "d.title",
    "ua.progress",
    "ua.planned_date",
    "ua.completed_date",
    "ua.created_at",
];

const DOCUMENT_COLUMNS: &[SelectColumn] = &[
    col("d.id", "id"),
    col("d.title", "title"),
    col("d.language", "language"),
    col("d.user_id", "user_id"),
    col("u.username", "username"),
    col("d.created_at", "created_at"),
    col("d.updated_at", "updated_at"),
];

const DOCUMENT_SORT: &[&str] = &[
    "d.id",
    "d.title",
    "d.language",
    "u.username",
    "d.created_at",
    "d.updated_at",
];

const TAG_COLUMNS: &[SelectColumn] = &[
    col("t.id", "id"),
    col("t.name", "name"),
    col("t.color", "color"),
    col("t.user_id", "user_id"),
    col("u.username", "username"),
    col("t.created_at", "created_at"),
];

const TAG_SORT: &[&str] = &["t.id", "t.name", "t.color", "u.username", "t.created_at"];

impl QueryShape {
    pub fn name(&self) -> &'static str {
        match self {
            QueryShape::UserActivity => "user_activity",
            QueryShape::Document => "document",
            QueryShape::Tag => "tag",
        }
    }

    /// Ordered SELECT list; row mappers read positions in exactly this order
    pub fn select_columns(&self) -> &'static [SelectColumn] {
        match self {
            QueryShape::UserActivity => USER_ACTIVITY_COLUMNS,
            QueryShape::Document => DOCUMENT_COLUMNS,
            QueryShape::Tag => TAG_COLUMNS,
        }
    }

    pub fn from_clause(&self) -> &'static str {
        match self {
            QueryShape::UserActivity => {
                "FROM user_activities ua \
                 JOIN users u ON ua.user_id = u.id \
                 LEFT JOIN documents d ON ua.entity_id = d.id"
            }
            QueryShape::Document => "FROM documents d JOIN users u ON d.user_id = u.id",
            QueryShape::Tag => "FROM tags t JOIN users u ON t.user_id = u.id",
        }
    }

    pub fn not_deleted_predicate(&self) -> &'static str {
        match self {
            QueryShape::UserActivity => "ua.deleted_at IS NULL",
            QueryShape::Document => "d.deleted_at IS NULL",
            QueryShape::Tag => "t.deleted_at IS NULL",
        }
    }

    /// Index -> column table for ORDER BY
    pub fn sort_columns(&self) -> &'static [&'static str] {
        match self {
            QueryShape::UserActivity => USER_ACTIVITY_SORT,
            QueryShape::Document => DOCUMENT_SORT,
            QueryShape::Tag => TAG_SORT,
        }
    }

    pub fn default_sort_column(&self) -> &'static str {
        match self {
            QueryShape::UserActivity => "ua.created_at",
            QueryShape::Document => "d.created_at",
            QueryShape::Tag => "t.name",
        }
    }

    /// Unknown indexes fall back to the shape default.
    pub fn resolve_sort_column(&self, index: u32) -> &'static str {
        match self.sort_columns().get(index as usize) {
            Some(column) => column,
            None => {
                log::warn!(
                    "Sort column {} is not defined for {} queries, using {}",
                    index,
                    self.name(),
                    self.default_sort_column()
                );
                self.default_sort_column()
            }
        }
    }

    /// `SELECT <expr> AS <alias>, ... FROM ...` without any predicate
    pub fn base_query(&self) -> String {
        let columns = self
            .select_columns()
            .iter()
            .map(|c| format!("{} AS {}", c.expr, c.alias))
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT {} {}", columns, self.from_clause())
    }
}
