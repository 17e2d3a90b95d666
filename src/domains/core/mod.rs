pub mod repository;

pub use repository::{CriteriaSearch, FindById, SoftDeletable};
