use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row};

use crate::errors::{DomainError, DomainResult};
use crate::query::shape::QueryShape;

/// DTOs read positionally from a row of their shape's SELECT list.
pub trait FromPositionalRow: Sized {
    const SHAPE: QueryShape;

    fn from_positional_row(reader: &mut RowReader<'_>) -> DomainResult<Self>;
}

/// Cursor over a result row that checks every read against the shape's
/// SELECT list, so a column list and a mapper that disagree fail instead of
/// silently assigning the wrong field.
pub struct RowReader<'r> {
    row: &'r SqliteRow,
    shape: QueryShape,
    position: usize,
}

impl<'r> RowReader<'r> {
    pub fn new(row: &'r SqliteRow, shape: QueryShape) -> DomainResult<Self> {
        let expected = shape.select_columns();
        let actual = row.columns();
        if actual.len() != expected.len() {
            return Err(DomainError::RowMapping {
                shape: shape.name().to_string(),
                position: actual.len().min(expected.len()),
                reason: format!("expected {} columns, row has {}", expected.len(), actual.len()),
            });
        }
        for (position, (column, select)) in actual.iter().zip(expected).enumerate() {
            if column.name() != select.alias {
                return Err(DomainError::RowMapping {
                    shape: shape.name().to_string(),
                    position,
                    reason: format!("expected column '{}', found '{}'", select.alias, column.name()),
                });
            }
        }
        Ok(Self {
            row,
            shape,
            position: 0,
        })
    }

    fn mapping_error(&self, position: usize, reason: String) -> DomainError {
        DomainError::RowMapping {
            shape: self.shape.name().to_string(),
            position,
            reason,
        }
    }

    /// Decode the next column, advancing the cursor
    fn next<T>(&mut self) -> DomainResult<T>
    where
        T: for<'a> sqlx::Decode<'a, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        let position = self.position;
        let select = self.shape.select_columns().get(position).ok_or_else(|| {
            self.mapping_error(position, "read past the end of the select list".to_string())
        })?;
        let value = self.row.try_get::<T, _>(position).map_err(|e| {
            self.mapping_error(position, format!("column '{}': {}", select.alias, e))
        })?;
        self.position += 1;
        Ok(value)
    }

    pub fn text(&mut self) -> DomainResult<String> {
        self.next::<String>()
    }

    pub fn optional_text(&mut self) -> DomainResult<Option<String>> {
        self.next::<Option<String>>()
    }

    pub fn integer(&mut self) -> DomainResult<i64> {
        self.next::<i64>()
    }

    /// Integer column that must fit in an `i32`
    pub fn small_integer(&mut self) -> DomainResult<i32> {
        let position = self.position;
        let value = self.integer()?;
        i32::try_from(value)
            .map_err(|_| self.mapping_error(position, format!("value {} does not fit in i32", value)))
    }

    pub fn timestamp_millis(&mut self) -> DomainResult<i64> {
        let position = self.position;
        let raw = self.text()?;
        self.parse_millis(position, &raw)
    }

    /// NULL maps to `None`, never to zero or a sentinel date
    pub fn optional_timestamp_millis(&mut self) -> DomainResult<Option<i64>> {
        let position = self.position;
        match self.optional_text()? {
            Some(raw) => self.parse_millis(position, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn parse_millis(&self, position: usize, raw: &str) -> DomainResult<i64> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.timestamp_millis())
            .map_err(|e| self.mapping_error(position, format!("invalid timestamp '{}': {}", raw, e)))
    }

    /// Every selected column must have been consumed by the mapper
    pub fn finish(self) -> DomainResult<()> {
        let expected = self.shape.select_columns().len();
        if self.position != expected {
            return Err(self.mapping_error(
                self.position,
                format!("mapper read {} of {} columns", self.position, expected),
            ));
        }
        Ok(())
    }
}

pub fn map_row<T: FromPositionalRow>(row: &SqliteRow) -> DomainResult<T> {
    let mut reader = RowReader::new(row, T::SHAPE)?;
    let value = T::from_positional_row(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

pub fn map_rows<T: FromPositionalRow>(rows: &[SqliteRow]) -> DomainResult<Vec<T>> {
    rows.iter().map(map_row::<T>).collect()
}
