//! PostgreSQL store
//!
//! Uses SQLx with runtime-checked queries. `users.username` is the primary
//! key, so a racing duplicate insert fails with a unique violation, which is
//! reported as `RolodexError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolodex_core::{
    Contact, ContactPatch, ContactStore, NewContact, NewUser, Result, RolodexError, UserRecord,
    UserStore,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username      VARCHAR(64) PRIMARY KEY,
        fullname      VARCHAR(255) NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id    BIGSERIAL PRIMARY KEY,
        phone VARCHAR(32) NOT NULL
    )
    "#,
];

/// PostgreSQL-backed users and contacts
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the tables exist
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| RolodexError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create tables if missing
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RolodexError::DatabaseError(format!("Failed to create schema: {e}")))?;
        }
        tracing::debug!("database schema ready");
        Ok(())
    }
}

/// User row from database
#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    fullname: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            username: row.username,
            fullname: row.fullname,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Contact row from database
#[derive(Debug, FromRow)]
struct ContactRow {
    id: i64,
    phone: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            phone: row.phone,
        }
    }
}

fn db_error(context: &str, err: sqlx::Error) -> RolodexError {
    RolodexError::DatabaseError(format!("{context}: {err}"))
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, fullname, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user", e))?;

        Ok(row.map(UserRecord::from))
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, fullname, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING username, fullname, password_hash, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.fullname)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                RolodexError::Conflict(format!("username {} already exists", user.username)),
            ),
            Err(e) => Err(db_error("Failed to create user", e)),
        }
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let row = sqlx::query_as::<_, ContactRow>(
            "INSERT INTO contacts (phone) VALUES ($1) RETURNING id, phone",
        )
        .bind(&contact.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create contact", e))?;

        Ok(row.into())
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>("SELECT id, phone FROM contacts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list contacts", e))?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>("SELECT id, phone FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch contact", e))?;

        Ok(row.map(Contact::from))
    }

    async fn update_contact(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            "UPDATE contacts SET phone = COALESCE($2, phone) WHERE id = $1 RETURNING id, phone",
        )
        .bind(id)
        .bind(patch.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update contact", e))?;

        Ok(row.map(Contact::from))
    }

    async fn delete_contact(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete contact", e))?;

        Ok(result.rows_affected() > 0)
    }
}
