pub mod repository;
pub mod types;

pub use repository::{DocumentDao, SqliteDocumentDao};
pub use types::{DocumentCriteria, DocumentDto};
