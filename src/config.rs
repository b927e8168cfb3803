use std::env;
use std::path::PathBuf;

use crate::errors::AppError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// JSON seed for the in-memory store.
    pub seed_file: Option<PathBuf>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET")
            .ok_or_else(|| AppError::ConfigError("JWT_SECRET must be set and non-empty".to_string()))?;

        Ok(Config {
            jwt_secret,
            database_url: non_empty("DATABASE_URL"),
            seed_file: non_empty("SEED_FILE").map(PathBuf::from),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}
