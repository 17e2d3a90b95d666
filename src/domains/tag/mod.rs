pub mod repository;
pub mod types;

pub use repository::{SqliteTagDao, TagDao};
pub use types::{TagCriteria, TagDto};
