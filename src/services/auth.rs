//! Authentication service
//!
//! Provides password hashing with Argon2 and user authentication.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand::rngs::OsRng;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::User;

const USER_COLUMNS: &str =
    "id, organization_id, username, email, password_hash, role, created_at, updated_at";

/// Authentication service for user management
pub struct AuthService {
    pool: SqlitePool,
}

impl AuthService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Authenticate a user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.get_user_by_username(username).await?;

        match user {
            Some(user) => {
                if Self::verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by username")?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    pub async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by ID")?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    /// Create a new user within an organization
    pub async fn create_user(
        &self,
        organization_id: Uuid,
        username: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User> {
        if self.get_user_by_username(username).await?.is_some() {
            anyhow::bail!("Username already exists");
        }
        if self.get_user_by_email(email).await?.is_some() {
            anyhow::bail!("Email already exists");
        }

        let password_hash = Self::hash_password(password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            organization_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, organization_id, username, email, password_hash, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(user.organization_id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(user)
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    let id: String = row.get("id");
    let organization_id: String = row.get("organization_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    User {
        id: parse_db_uuid(&id),
        organization_id: parse_db_uuid(&organization_id),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        created_at: parse_db_timestamp(&created_at),
        updated_at: parse_db_timestamp(&updated_at),
    }
}
