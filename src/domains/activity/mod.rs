pub mod repository;
pub mod service;
pub mod types;

pub use repository::{SqliteUserActivityDao, UserActivityDao};
pub use service::{UserActivityService, UserActivityServiceImpl};
pub use types::{SaveActivityRequest, UserActivity, UserActivityCriteria, UserActivityDto};
