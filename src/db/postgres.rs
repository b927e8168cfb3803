use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

use super::{EmployeeRepository, TokenRepository, UserRepository};
use crate::errors::AppError;
use crate::models::directory::{EmployeeFilter, EmployeePage, Pagination};
use crate::models::profile::{EmergencyContact, ExperienceEntry, IdNameObject, Skill};
use crate::models::record::{Avatars, EmployeeRecord, TypedResumeLine, TypedSkill};
use crate::models::user::{NewToken, TokenKind, User};
use crate::models::wire::format_date;

const EMPLOYEE_COLUMNS: &str = r#"
    SELECT
        e.id, e.name, e.birthday,
        e.avatar_128, e.avatar_256, e.avatar_512, e.avatar_1024, e.avatar_1920,
        e.job_title, e.email, e.phone, e.mobile_phone, e.work_email,
        e.gender, e.place_of_birth, e.marital, e.identification_id,
        e.emergency_contact, e.emergency_phone,
        d.id AS department_ref_id, d.name AS department_ref_name,
        c.id AS country_ref_id, c.name AS country_ref_name,
        j.id AS job_ref_id, j.name AS job_ref_name,
        m.id AS manager_ref_id, m.name AS manager_ref_name
    FROM employees e
    LEFT JOIN departments d ON d.id = e.department_id
    LEFT JOIN countries c ON c.id = e.country_id
    LEFT JOIN jobs j ON j.id = e.job_id
    LEFT JOIN employees m ON m.id = e.parent_id
"#;

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: i32,
    name: String,
    birthday: Option<NaiveDate>,
    avatar_128: Option<String>,
    avatar_256: Option<String>,
    avatar_512: Option<String>,
    avatar_1024: Option<String>,
    avatar_1920: Option<String>,
    job_title: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    mobile_phone: Option<String>,
    work_email: Option<String>,
    gender: Option<String>,
    place_of_birth: Option<String>,
    marital: Option<String>,
    identification_id: Option<String>,
    emergency_contact: Option<String>,
    emergency_phone: Option<String>,
    department_ref_id: Option<i32>,
    department_ref_name: Option<String>,
    country_ref_id: Option<i32>,
    country_ref_name: Option<String>,
    job_ref_id: Option<i32>,
    job_ref_name: Option<String>,
    manager_ref_id: Option<i32>,
    manager_ref_name: Option<String>,
}

fn reference(id: Option<i32>, name: Option<String>) -> Option<IdNameObject> {
    id.map(|id| IdNameObject { id, name: name.unwrap_or_default() })
}

impl EmployeeRow {
    fn into_record(self) -> EmployeeRecord {
        EmployeeRecord {
            id: self.id,
            name: self.name,
            birthday: format_date(self.birthday),
            avatars: Avatars {
                size_128: self.avatar_128.unwrap_or_default(),
                size_256: self.avatar_256.unwrap_or_default(),
                size_512: self.avatar_512.unwrap_or_default(),
                size_1024: self.avatar_1024.unwrap_or_default(),
                size_1920: self.avatar_1920.unwrap_or_default(),
            },
            department: reference(self.department_ref_id, self.department_ref_name),
            country: reference(self.country_ref_id, self.country_ref_name),
            job: reference(self.job_ref_id, self.job_ref_name),
            manager: reference(self.manager_ref_id, self.manager_ref_name),
            job_title: self.job_title.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            mobile_phone: self.mobile_phone.unwrap_or_default(),
            work_email: self.work_email.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            place_of_birth: self.place_of_birth.unwrap_or_default(),
            marital: self.marital.unwrap_or_default(),
            identification_id: self.identification_id.unwrap_or_default(),
            emergency_contact: EmergencyContact {
                contact_name: self.emergency_contact.unwrap_or_default(),
                contact_phone: self.emergency_phone.unwrap_or_default(),
            },
            skills: Vec::new(),
            resume_lines: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SkillRow {
    id: i32,
    name: String,
    level_progress: i32,
    skill_type: String,
}

#[derive(sqlx::FromRow)]
struct ResumeRow {
    id: i32,
    name: String,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
    description: Option<String>,
    line_type: String,
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    builder.push(" WHERE TRUE");
    if let Some(department_id) = filter.department_id {
        builder.push(" AND e.department_id = ").push_bind(department_id);
    }
    if let Some(job_id) = filter.job_id {
        builder.push(" AND e.job_id = ").push_bind(job_id);
    }
    if let Some(manager_id) = filter.manager_id {
        builder.push(" AND e.parent_id = ").push_bind(manager_id);
    }
    if let Some(search) = &filter.search {
        builder.push(" AND (e.name ILIKE ").push_bind(like_pattern(search));
        if let Some(id) = filter.search_id() {
            builder.push(" OR e.id = ").push_bind(id);
        }
        builder.push(")");
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|err| AppError::ConfigError(format!("Failed to connect to the database: {}", err)))?;
        info!("Connected to PostgreSQL");
        Ok(PgStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EmployeeRepository for PgStore {
    async fn find_employee(&self, id: i32) -> Result<Option<EmployeeRecord>, AppError> {
        let sql = format!("{} WHERE e.id = $1", EMPLOYEE_COLUMNS);
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = row.into_record();

        record.skills = sqlx::query_as::<_, SkillRow>(
            "SELECT id, name, level_progress, skill_type FROM employee_skills \
             WHERE employee_id = $1 ORDER BY skill_type, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| TypedSkill {
            skill_type: row.skill_type,
            skill: Skill { id: row.id, name: row.name, level_progress: row.level_progress },
        })
        .collect();

        record.resume_lines = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, name, date_start, date_end, description, line_type FROM resume_lines \
             WHERE employee_id = $1 ORDER BY line_type, date_end DESC, date_start DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| TypedResumeLine {
            line_type: row.line_type,
            entry: ExperienceEntry {
                id: row.id,
                name: row.name,
                date_start: format_date(row.date_start),
                date_end: format_date(row.date_end),
                description: row.description.unwrap_or_default(),
            },
        })
        .collect();

        Ok(Some(record))
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<EmployeePage, AppError> {
        // Count and page read from one snapshot.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM employees e");
        push_filter(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

        let window = Pagination::resolve(page, limit, total);
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(EMPLOYEE_COLUMNS);
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY e.name ASC, e.id ASC LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let rows = builder.build_query_as::<EmployeeRow>().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        Ok(EmployeePage {
            total,
            window,
            records: rows.into_iter().map(EmployeeRow::into_record).collect(),
        })
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, login, password_hash FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn create_token(&self, token: NewToken) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_tokens \
             (user_id, access_token, refresh_token, expires_at, refresh_expires_at, active) \
             VALUES ($1, $2, $3, $4, $5, TRUE)",
        )
        .bind(token.user_id)
        .bind(&token.access_digest)
        .bind(&token.refresh_digest)
        .bind(token.access_expires_at)
        .bind(token.refresh_expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn validate_token(
        &self,
        digest: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, AppError> {
        let sql = match kind {
            TokenKind::Access => {
                "SELECT user_id FROM user_tokens \
                 WHERE access_token = $1 AND active AND expires_at > $2 LIMIT 1"
            }
            TokenKind::Refresh => {
                "SELECT user_id FROM user_tokens \
                 WHERE refresh_token = $1 AND active AND refresh_expires_at > $2 LIMIT 1"
            }
        };
        let user_id = sqlx::query_scalar::<_, i32>(sql)
            .bind(digest)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user_id)
    }

    async fn deactivate_access_token(&self, digest: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE user_tokens SET active = FALSE WHERE access_token = $1 AND active")
            .bind(digest)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
