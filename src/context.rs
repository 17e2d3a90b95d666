use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::CoreConfig;
use crate::db_migration::initialize_database;
use crate::domains::activity::{
    SqliteUserActivityDao, UserActivityDao, UserActivityService, UserActivityServiceImpl,
};
use crate::domains::document::{DocumentDao, SqliteDocumentDao};
use crate::domains::tag::{SqliteTagDao, TagDao};
use crate::errors::{DbError, DomainResult};

/// Everything a caller needs after startup: the pool, the DAOs and the
/// activity service, all sharing one pool and one pagination config.
#[derive(Clone)]
pub struct ActivityCore {
    pub pool: SqlitePool,
    pub config: CoreConfig,
    pub user_activities: Arc<dyn UserActivityDao>,
    pub documents: Arc<dyn DocumentDao>,
    pub tags: Arc<dyn TagDao>,
    pub activity_service: Arc<dyn UserActivityService>,
}

impl ActivityCore {
    /// Wire the DAOs and service over an already migrated pool
    pub fn from_pool(pool: SqlitePool, config: CoreConfig) -> Self {
        let pagination = config.pagination;
        let user_activities: Arc<dyn UserActivityDao> =
            Arc::new(SqliteUserActivityDao::new(pool.clone(), pagination));
        let documents: Arc<dyn DocumentDao> = Arc::new(SqliteDocumentDao::new(pool.clone(), pagination));
        let tags: Arc<dyn TagDao> = Arc::new(SqliteTagDao::new(pool.clone(), pagination));
        let activity_service: Arc<dyn UserActivityService> =
            Arc::new(UserActivityServiceImpl::new(pool.clone(), user_activities.clone()));

        Self {
            pool,
            config,
            user_activities,
            documents,
            tags,
            activity_service,
        }
    }
}

/// Set up logging, connect, apply pending migrations and wire everything up.
/// Safe to call more than once; logging is only initialized the first time.
pub async fn initialize(config: &CoreConfig) -> DomainResult<ActivityCore> {
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "debug");
        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = env_logger::try_init();

    log::info!("Starting initialization");
    log::debug!("Database URL: {}", config.database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Database connection failed: {}", e);
            DbError::from(e)
        })?;
    log::info!("Database connection established");

    initialize_database(&pool).await?;

    Ok(ActivityCore::from_pool(pool, config.clone()))
}
