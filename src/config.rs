use std::env;
use std::str::FromStr;

use crate::errors::{DomainError, DomainResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://activity.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size bounds applied to every criteria search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

/// Settings needed to bring up the store and the DAOs
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub pagination: PaginationConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            pagination: PaginationConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load from the environment, reading a `.env` file first if present.
    pub fn from_env() -> DomainResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("ACTIVITY_DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_var(&lookup, "ACTIVITY_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let default_limit = parse_var(&lookup, "ACTIVITY_PAGE_SIZE_DEFAULT", DEFAULT_PAGE_SIZE)?;
        let max_limit = parse_var(&lookup, "ACTIVITY_PAGE_SIZE_MAX", MAX_PAGE_SIZE)?;

        if max_connections == 0 {
            return Err(DomainError::Configuration(
                "ACTIVITY_DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if default_limit == 0 || default_limit > max_limit {
            return Err(DomainError::Configuration(format!(
                "ACTIVITY_PAGE_SIZE_DEFAULT must be between 1 and {}",
                max_limit
            )));
        }

        Ok(Self {
            database_url,
            max_connections,
            pagination: PaginationConfig {
                default_limit,
                max_limit,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> DomainResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            DomainError::Configuration(format!("{} has an invalid value: {}", key, raw))
        }),
    }
}
