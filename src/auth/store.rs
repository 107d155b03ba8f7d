use async_trait::async_trait;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

/// Persistence seam for user records. The handlers and the OAuth bridge only
/// ever see this trait; `PgUserStore` backs it in production and
/// `MemoryUserStore` in tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Duplicate check for registration: either field taken rejects the
    /// registration before any write happens.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> anyhow::Result<Option<User>>;

    /// Create a password-path user with role USER.
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User>;

    /// Create an OAuth-only user (no password hash) with role USER.
    async fn create_from_google(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User>;

    /// Link or refresh Google identity on an existing account. Username, role
    /// and any password hash are left untouched.
    async fn link_google(
        &self,
        id: Uuid,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User>;
}

/// In-memory store backing `AppState::fake()`. Enforces the same uniqueness
/// the schema's unique indexes do, so duplicate registrations fail here too.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Vec<User>>> {
        self.users
            .lock()
            .map_err(|_| anyhow::anyhow!("user store poisoned"))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> anyhow::Result<Option<User>> {
        Ok(self
            .lock()?
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let mut users = self.lock()?;
        if users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            anyhow::bail!("unique constraint violation on users");
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
            google_id: None,
            avatar_url: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn create_from_google(
        &self,
        username: &str,
        email: &str,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User> {
        let mut users = self.lock()?;
        if users
            .iter()
            .any(|u| u.email == email || u.google_id.as_deref() == Some(google_id))
        {
            anyhow::bail!("unique constraint violation on users");
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: None,
            google_id: Some(google_id.to_string()),
            avatar_url: avatar_url.map(str::to_string),
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn link_google(
        &self,
        id: Uuid,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<User> {
        let mut users = self.lock()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("no such user"))?;
        user.google_id = Some(google_id.to_string());
        user.avatar_url = avatar_url.map(str::to_string);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }
}
