//! Criteria-driven, paginated and sorted read access over user activities,
//! documents and tags stored in SQLite, plus the activity create/update
//! service that sits in front of the activity DAO.

// Public modules
pub mod config;
pub mod context;
pub mod domains;
pub mod errors;
pub mod query;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

#[cfg(test)]
mod test_support;

pub use config::{CoreConfig, PaginationConfig};
pub use context::{initialize, ActivityCore};
pub use errors::{DbError, DomainError, DomainResult, ValidationError};
pub use types::{PageRequest, PaginatedResult, SortCriteria};
