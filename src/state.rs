use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::db::{EmployeeRepository, MemoryStore, PgStore, Seed, TokenRepository, UserRepository};
use crate::errors::AppError;
use crate::utils::jwt::TokenIssuer;

/// Shared per-worker state, registered as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub issuer: TokenIssuer,
}

impl AppState {
    pub fn with_memory_store(store: MemoryStore, jwt_secret: &str) -> Self {
        let store = Arc::new(store);
        AppState {
            employees: store.clone(),
            users: store.clone(),
            tokens: store,
            issuer: TokenIssuer::new(jwt_secret),
        }
    }

    pub fn with_pg_store(store: PgStore, jwt_secret: &str) -> Self {
        let store = Arc::new(store);
        AppState {
            employees: store.clone(),
            users: store.clone(),
            tokens: store,
            issuer: TokenIssuer::new(jwt_secret),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        if let Some(database_url) = &config.database_url {
            let store = PgStore::connect(database_url).await?;
            return Ok(Self::with_pg_store(store, &config.jwt_secret));
        }

        let store = match &config.seed_file {
            Some(path) => {
                info!("Loading seed data from {}", path.display());
                MemoryStore::from_seed(Seed::from_path(path)?)?
            }
            None => {
                warn!("Neither DATABASE_URL nor SEED_FILE set; starting with an empty in-memory store");
                MemoryStore::new()
            }
        };
        Ok(Self::with_memory_store(store, &config.jwt_secret))
    }
}
