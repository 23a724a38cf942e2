//! Postgres-backed users + courses store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `UniqueConstraint` | Email address already registered (`create_user`) |
//! | Database (foreign key violation) | `23503` | `Backend` | Course owner missing |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, connection failures, decoding |
//!
//! Field rules run before any statement is sent, so `Validation` never
//! originates here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use coursehub_auth::{AccountDraft, PasswordHash, Principal};
use coursehub_core::{CourseId, UserId};
use coursehub_courses::{Course, CourseChanges, CourseDraft};

use super::r#trait::{
    CourseFilter, CourseStore, CourseWithOwner, OwnerSummary, StoreError, UserStore,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              BIGSERIAL PRIMARY KEY,
        first_name      TEXT NOT NULL,
        last_name       TEXT NOT NULL,
        email_address   TEXT NOT NULL,
        password        TEXT NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS users_email_address_key ON users (email_address)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id                BIGSERIAL PRIMARY KEY,
        title             TEXT NOT NULL,
        description       TEXT NOT NULL,
        estimated_time    TEXT,
        materials_needed  TEXT,
        user_id           BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

const COURSE_COLUMNS: &str = r#"
    c.id, c.title, c.description, c.estimated_time, c.materials_needed,
    c.user_id, c.created_at, c.updated_at
"#;

/// Postgres-backed store.
///
/// Uses the SQLx pool (thread-safe, `Send + Sync`); updates run in a
/// transaction holding a row lock so concurrent writers cannot interleave
/// between the read and the write.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `users` and `courses` tables when absent.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, draft), fields(user_id), err)]
    async fn create_user(&self, draft: AccountDraft) -> Result<UserId, StoreError> {
        let account = draft.validate()?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email_address, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email_address)
        .bind(account.password_hash.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::email_in_use()
            } else {
                map_sqlx_error("create_user", e)
            }
        })?;

        let id = UserId::new(
            row.try_get::<i64, _>("id")
                .map_err(|e| map_sqlx_error("create_user", e))?,
        );
        Span::current().record("user_id", id.get());
        Ok(id)
    }

    #[instrument(skip(self, email), err)]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email_address, password, created_at, updated_at
            FROM users
            WHERE email_address = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(|r| principal_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find_user_by_email", e))
    }
}

#[async_trait]
impl CourseStore for PostgresStore {
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id, course_id), err)]
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseId, StoreError> {
        let course = draft.validate()?;

        let row = sqlx::query(
            r#"
            INSERT INTO courses (title, description, estimated_time, materials_needed, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.estimated_time)
        .bind(&course.materials_needed)
        .bind(course.user_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_course", e))?;

        let id = CourseId::new(
            row.try_get::<i64, _>("id")
                .map_err(|e| map_sqlx_error("create_course", e))?,
        );
        Span::current().record("course_id", id.get());
        Ok(id)
    }

    #[instrument(skip(self), fields(course_count), err)]
    async fn find_courses(&self, filter: CourseFilter) -> Result<Vec<CourseWithOwner>, StoreError> {
        let sql = format!(
            r#"
            SELECT {COURSE_COLUMNS},
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.email_address AS owner_email_address
            FROM courses c
            JOIN users u ON u.id = c.user_id
            WHERE ($1::BIGINT IS NULL OR c.id = $1)
            ORDER BY c.id ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.id.map(|id| id.get()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_courses", e))?;

        let courses = rows
            .iter()
            .map(|row| {
                let course = course_from_row(row)?;
                let owner = OwnerSummary {
                    id: course.user_id,
                    first_name: row.try_get("owner_first_name")?,
                    last_name: row.try_get("owner_last_name")?,
                    email_address: row.try_get("owner_email_address")?,
                };
                Ok(CourseWithOwner { course, owner })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| map_sqlx_error("find_courses", e))?;

        Span::current().record("course_count", courses.len());
        Ok(courses)
    }

    #[instrument(skip(self), fields(course_id = %id), err)]
    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_course", e))?;

        row.map(|r| course_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("find_course", e))
    }

    #[instrument(skip(self, changes), fields(course_id = %id), err)]
    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_course", e))?;

        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses c WHERE c.id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_course", e))?
            .ok_or(StoreError::NotFound)?;
        let mut course = course_from_row(&row).map_err(|e| map_sqlx_error("update_course", e))?;

        // Dropping `tx` on a rejected update rolls it back.
        course.apply(changes, Utc::now())?;

        sqlx::query(
            r#"
            UPDATE courses
            SET title = $2, description = $3, estimated_time = $4,
                materials_needed = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.estimated_time)
        .bind(&course.materials_needed)
        .bind(course.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_course", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_course", e))?;
        Ok(course)
    }

    #[instrument(skip(self), fields(course_id = %id), err)]
    async fn destroy_course(&self, id: CourseId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("destroy_course", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn principal_from_row(row: &PgRow) -> Result<Principal, sqlx::Error> {
    Ok(Principal {
        id: UserId::new(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email_address: row.try_get("email_address")?,
        password_hash: PasswordHash::from_encoded(row.try_get::<String, _>("password")?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<Course, sqlx::Error> {
    Ok(Course {
        id: CourseId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        estimated_time: row.try_get("estimated_time")?,
        materials_needed: row.try_get("materials_needed")?,
        user_id: UserId::new(row.try_get("user_id")?),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23503") => StoreError::backend(
                operation,
                format!("foreign key violation: {}", db_err.message()),
            ),
            code => StoreError::backend(
                operation,
                format!("database error ({}): {}", code.unwrap_or("-"), db_err.message()),
            ),
        },
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::backend(operation, format!("sqlx error: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
