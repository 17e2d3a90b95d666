//! Criteria to paginated SQL translation.
//!
//! A search is built for one [`QueryShape`]: the builder applies the
//! soft-delete filter and the criteria as bound equality predicates, resolves
//! the positional sort index through the shape's column table, and the
//! pagination executor runs the count and windowed variants on an explicitly
//! passed connection. Rows come back through [`FromPositionalRow`] mappers
//! that check the SELECT list position by position.

pub mod builder;
pub mod pagination;
pub mod row_mapper;
pub mod shape;

pub use builder::{Criteria, CriteriaQueryBuilder, Predicate, QueryParam, SqlValue};
pub use pagination::{execute_paginated_query, find_page, RawPage};
pub use row_mapper::{map_row, map_rows, FromPositionalRow, RowReader};
pub use shape::{QueryShape, SelectColumn};
