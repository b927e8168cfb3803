use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: i32,
    pub login: String,
    pub password_hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// A freshly issued token pair. Tokens are kept only as SHA-256 digests.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub user_id: i32,
    pub access_digest: String,
    pub refresh_digest: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}
