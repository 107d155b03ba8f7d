use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};
use crate::auth::store::UserStore;

/// Postgres-backed [`UserStore`]. The schema's unique indexes on username,
/// email and google_id close duplicate-creation races.
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $2
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_from_google(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, google_id, avatar_url, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(google_id)
        .bind(avatar_url)
        .bind(Role::User)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn link_google(
        &self,
        id: Uuid,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = $2, avatar_url = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, password_hash, google_id, avatar_url, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(google_id)
        .bind(avatar_url)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}
