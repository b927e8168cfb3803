use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{EmployeeRepository, TokenRepository, UserRepository};
use crate::errors::AppError;
use crate::models::directory::{EmployeeFilter, EmployeePage, Pagination};
use crate::models::record::EmployeeRecord;
use crate::models::user::{NewToken, TokenKind, User};
use crate::utils::password::hash_password;

#[derive(Deserialize, Debug)]
pub struct SeedUser {
    pub id: i32,
    pub login: String,
    pub password: String,
}

/// Contents of a `SEED_FILE`.
#[derive(Deserialize, Debug, Default)]
pub struct Seed {
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl Seed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::ConfigError(format!("cannot read seed file {}: {}", path.display(), err))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            AppError::ConfigError(format!("invalid seed file {}: {}", path.display(), err))
        })
    }
}

#[derive(Debug, Clone)]
struct TokenRow {
    user_id: i32,
    access_digest: String,
    refresh_digest: String,
    access_expires_at: DateTime<Utc>,
    refresh_expires_at: DateTime<Utc>,
    active: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    employees: Arc<RwLock<BTreeMap<i32, EmployeeRecord>>>,
    users: Arc<RwLock<BTreeMap<i32, User>>>,
    tokens: Arc<RwLock<Vec<TokenRow>>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, AppError> {
    lock.read()
        .map_err(|_| AppError::InternalServerError("Store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, AppError> {
    lock.write()
        .map_err(|_| AppError::InternalServerError("Store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a seed, hashing the plaintext user passwords it carries.
    pub fn from_seed(seed: Seed) -> Result<Self, AppError> {
        let store = Self::new();
        for employee in seed.employees {
            store.insert_employee(employee)?;
        }
        for user in seed.users {
            store.insert_user(User {
                id: user.id,
                login: user.login,
                password_hash: hash_password(&user.password)?,
            })?;
        }
        Ok(store)
    }

    pub fn insert_employee(&self, record: EmployeeRecord) -> Result<(), AppError> {
        write(&self.employees)?.insert(record.id, record);
        Ok(())
    }

    pub fn insert_user(&self, user: User) -> Result<(), AppError> {
        write(&self.users)?.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn find_employee(&self, id: i32) -> Result<Option<EmployeeRecord>, AppError> {
        Ok(read(&self.employees)?.get(&id).cloned())
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<EmployeePage, AppError> {
        let employees = read(&self.employees)?;
        let mut matching: Vec<&EmployeeRecord> =
            employees.values().filter(|record| filter.matches(record)).collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let window = Pagination::resolve(page, limit, total);
        let records = matching
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|record| EmployeeRecord {
                skills: Vec::new(),
                resume_lines: Vec::new(),
                ..record.clone()
            })
            .collect();

        Ok(EmployeePage { total, window, records })
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        Ok(read(&self.users)?
            .values()
            .find(|user| user.login == login)
            .cloned())
    }

    async fn user_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(read(&self.users)?.contains_key(&id))
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn create_token(&self, token: NewToken) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tokens = write(&self.tokens)?;
        tokens.retain(|row| row.refresh_expires_at > now);
        tokens.push(TokenRow {
            user_id: token.user_id,
            access_digest: token.access_digest,
            refresh_digest: token.refresh_digest,
            access_expires_at: token.access_expires_at,
            refresh_expires_at: token.refresh_expires_at,
            active: true,
        });
        Ok(())
    }

    async fn validate_token(
        &self,
        digest: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AppError> {
        Ok(read(&self.tokens)?
            .iter()
            .filter(|row| row.active)
            .find(|row| match kind {
                TokenKind::Access => row.access_digest == digest && now < row.access_expires_at,
                TokenKind::Refresh => row.refresh_digest == digest && now < row.refresh_expires_at,
            })
            .map(|row| row.user_id))
    }

    async fn deactivate_access_token(&self, digest: &str) -> Result<bool, AppError> {
        let mut revoked = false;
        for row in write(&self.tokens)?
            .iter_mut()
            .filter(|row| row.active && row.access_digest == digest)
        {
            row.active = false;
            revoked = true;
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn employee(id: i32, name: &str, department: i32) -> EmployeeRecord {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "department": {"id": department, "name": format!("dept-{}", department)}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn listing_is_sorted_filtered_and_paged() {
        let store = MemoryStore::new();
        for (id, name, dept) in [(1, "Carol", 1), (2, "alice", 2), (3, "Bob", 1), (4, "Bob", 1)] {
            store.insert_employee(employee(id, name, dept)).unwrap();
        }

        let all = store.list_employees(&EmployeeFilter::default(), None, Some(10)).await.unwrap();
        assert_eq!(all.total, 4);
        let names: Vec<(String, i32)> = all.records.into_iter().map(|r| (r.name, r.id)).collect();
        assert_eq!(names[0], ("Bob".to_string(), 3));
        assert_eq!(names[1], ("Bob".to_string(), 4));

        let dept_one = EmployeeFilter { department_id: Some(1), ..Default::default() };
        let second_page = store.list_employees(&dept_one, Some(2), Some(2)).await.unwrap();
        assert_eq!((second_page.total, second_page.window.pages), (3, 2));
        assert_eq!(second_page.records.len(), 1);
        assert_eq!(second_page.records[0].name, "Carol");

        let past_end = store.list_employees(&dept_one, Some(9), Some(2)).await.unwrap();
        assert_eq!(past_end.window.page, 2);
        assert_eq!(past_end.records[0].name, "Carol");
    }

    #[tokio::test]
    async fn tokens_validate_until_revoked_or_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .create_token(NewToken {
                user_id: 7,
                access_digest: "a1".to_string(),
                refresh_digest: "r1".to_string(),
                access_expires_at: now + Duration::minutes(30),
                refresh_expires_at: now + Duration::days(7),
            })
            .await
            .unwrap();

        assert_eq!(store.validate_token("a1", TokenKind::Access, now).await.unwrap(), Some(7));
        assert_eq!(store.validate_token("r1", TokenKind::Refresh, now).await.unwrap(), Some(7));
        assert_eq!(store.validate_token("r1", TokenKind::Access, now).await.unwrap(), None);

        let later = now + Duration::hours(1);
        assert_eq!(store.validate_token("a1", TokenKind::Access, later).await.unwrap(), None);

        assert!(store.deactivate_access_token("a1").await.unwrap());
        assert!(!store.deactivate_access_token("a1").await.unwrap());
        assert_eq!(store.validate_token("r1", TokenKind::Refresh, now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn issuing_a_token_drops_rows_past_refresh_expiry() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let token = |n: u8, refresh_expires_at| NewToken {
            user_id: 1,
            access_digest: format!("a{}", n),
            refresh_digest: format!("r{}", n),
            access_expires_at: refresh_expires_at,
            refresh_expires_at,
        };

        store.create_token(token(1, now - Duration::days(1))).await.unwrap();
        store.create_token(token(2, now + Duration::days(7))).await.unwrap();
        store.create_token(token(3, now + Duration::days(7))).await.unwrap();

        let digests: Vec<String> = read(&store.tokens)
            .unwrap()
            .iter()
            .map(|row| row.refresh_digest.clone())
            .collect();
        assert_eq!(digests, vec!["r2", "r3"]);
    }
}
