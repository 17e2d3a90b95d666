pub mod activity;
pub mod core;
pub mod document;
pub mod tag;
