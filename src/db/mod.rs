//! Storage ports and their adapters.
//!
//! - `PgStore`: PostgreSQL, the production backend
//! - `MemoryStore`: seeded from JSON, used for demos and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::directory::{EmployeeFilter, EmployeePage};
use crate::models::record::EmployeeRecord;
use crate::models::user::{NewToken, TokenKind, User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryStore, Seed};
pub use postgres::PgStore;

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Full record, with typed skills and resume lines.
    async fn find_employee(&self, id: i32) -> Result<Option<EmployeeRecord>, AppError>;

    /// Matching total and one page ordered by name, then id, read together.
    /// Skills and resume lines are not loaded.
    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<EmployeePage, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError>;

    async fn user_exists(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create_token(&self, token: NewToken) -> Result<(), AppError>;

    /// Owner of an active, unexpired token with this digest.
    async fn validate_token(
        &self,
        digest: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AppError>;

    /// Returns whether any active token was revoked.
    async fn deactivate_access_token(&self, digest: &str) -> Result<bool, AppError>;
}
