//! Database repository for user credential operations.
//!
//! Provides user creation, lookups and the conditional updates that consume
//! verification and password reset tokens.

use crate::database::models::{NewUser, SubscriptionStatus, User};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, is_verified,
    verification_token, verification_token_expires_at,
    reset_password_token, reset_password_token_expires_at,
    subscription_status, subscription_expires_at,
    created_at, updated_at
"#;

/// Repository for user database operations.
///
/// Token consumption is expressed as a single `UPDATE` whose `WHERE` clause
/// carries the validity predicate, so a token can never be consumed twice or
/// after it expires, even under concurrent requests.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new unverified user.
    ///
    /// # Returns
    /// The created User, or `None` when the email is already registered. In
    /// that case nothing is written.
    pub async fn create_user(&self, user: NewUser) -> Result<Option<User>> {
        let query = format!(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, is_verified,
                verification_token, verification_token_expires_at,
                subscription_status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 0, ?, ?, 'none', ?, ?)
            ON CONFLICT(email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.verification_token)
            .bind(user.verification_token_expires_at)
            .bind(user.created_at)
            .bind(user.created_at)
            .fetch_optional(self.pool)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .context("Failed to get user by id")?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .context("Failed to get user by email")?;

        Ok(user)
    }

    /// Marks the owner of an unexpired verification token as verified and
    /// clears the token.
    ///
    /// # Returns
    /// `true` if a matching, unexpired token was consumed
    pub async fn verify_user(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET is_verified = 1,
                verification_token = NULL,
                verification_token_expires_at = NULL,
                updated_at = ?
            WHERE verification_token = ? AND verification_token_expires_at > ?
            "#,
        )
        .bind(now)
        .bind(token)
        .bind(now)
        .execute(self.pool)
        .await
        .context("Failed to verify user")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Stores a password reset token against the user with this email,
    /// replacing any earlier one.
    ///
    /// # Returns
    /// `true` if a user with this email exists
    pub async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET reset_password_token = ?,
                reset_password_token_expires_at = ?,
                updated_at = ?
            WHERE email = ?
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .bind(now)
        .bind(email)
        .execute(self.pool)
        .await
        .context("Failed to set password reset token")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Replaces the password hash of the owner of an unexpired reset token
    /// and clears the token.
    ///
    /// # Returns
    /// `true` if a matching, unexpired token was consumed
    pub async fn reset_password(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?,
                reset_password_token = NULL,
                reset_password_token_expires_at = NULL,
                updated_at = ?
            WHERE reset_password_token = ? AND reset_password_token_expires_at > ?
            "#,
        )
        .bind(password_hash)
        .bind(now)
        .bind(token)
        .bind(now)
        .execute(self.pool)
        .await
        .context("Failed to reset password")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Overwrites the subscription state of a user. Runs on the caller's
    /// connection, usually an open transaction.
    pub async fn update_subscription(
        conn: &mut SqliteConnection,
        user_id: &str,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET subscription_status = ?,
                subscription_expires_at = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(expires_at)
        .bind(now)
        .bind(user_id)
        .execute(conn)
        .await
        .context("Failed to update subscription")?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn new_user(id: &str, email: &str, token: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            verification_token: token.to_string(),
            verification_token_expires_at: now() + Duration::hours(24),
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn test_create_user_and_lookup() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo
            .create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap()
            .expect("user should be created");
        assert!(!user.is_verified);
        assert_eq!(user.subscription_status, SubscriptionStatus::None);
        assert_eq!(user.verification_token.as_deref(), Some("token-1"));

        let by_email = repo.get_user_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, "user-1");
        let by_id = repo.get_user_by_id("user-1").await.unwrap().unwrap();
        assert_eq!(by_id.email, "ana@x.com");
        assert!(repo.get_user_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_leaves_existing_row_untouched() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap()
            .unwrap();
        let duplicate = repo
            .create_user(new_user("user-2", "ana@x.com", "token-2"))
            .await
            .unwrap();
        assert!(duplicate.is_none());

        let stored = repo.get_user_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, "user-1");
        assert_eq!(stored.verification_token.as_deref(), Some("token-1"));
        assert!(repo.get_user_by_id("user-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verify_user_consumes_token_once() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap();

        assert!(repo.verify_user("token-1", now()).await.unwrap());
        assert!(!repo.verify_user("token-1", now()).await.unwrap());

        let user = repo.get_user_by_id("user-1").await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(user.verification_token.is_none());
        assert!(user.verification_token_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_verify_user_rejects_expired_token() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap();

        let at_expiry = now() + Duration::hours(24);
        assert!(!repo.verify_user("token-1", at_expiry).await.unwrap());

        let user = repo.get_user_by_id("user-1").await.unwrap().unwrap();
        assert!(!user.is_verified);
        assert_eq!(user.verification_token.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_reset_password_is_conditional_on_token() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap();

        assert!(!repo
            .set_reset_token("nobody@x.com", "reset-0", now() + Duration::hours(1), now())
            .await
            .unwrap());
        assert!(repo
            .set_reset_token("ana@x.com", "reset-1", now() + Duration::hours(1), now())
            .await
            .unwrap());

        assert!(!repo.reset_password("wrong", "new-hash", now()).await.unwrap());
        assert!(repo.reset_password("reset-1", "new-hash", now()).await.unwrap());
        assert!(!repo.reset_password("reset-1", "newer-hash", now()).await.unwrap());

        let user = repo.get_user_by_id("user-1").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(user.reset_password_token.is_none());
        assert!(user.reset_password_token_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_update_subscription() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        repo.create_user(new_user("user-1", "ana@x.com", "token-1"))
            .await
            .unwrap();

        let expires_at = now() + Duration::days(30);
        let mut conn = pool.acquire().await.unwrap();
        assert!(
            UserRepository::update_subscription(
                &mut conn,
                "user-1",
                SubscriptionStatus::Active,
                Some(expires_at),
                now(),
            )
            .await
            .unwrap()
        );
        drop(conn);

        let user = repo.get_user_by_id("user-1").await.unwrap().unwrap();
        assert_eq!(user.subscription_status, SubscriptionStatus::Active);
        assert_eq!(user.subscription_expires_at, Some(expires_at));
    }
}
