use tracing::info;

use crate::auth::repo_types::User;
use crate::auth::store::UserStore;
use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod provider;

use provider::IdentityAssertion;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::oauth_routes())
}

/// Bridge a verified third-party identity to a local user record.
///
/// Lookup is by email. An existing account gets its Google id and avatar
/// refreshed, keeping username, role and any password hash, so a password
/// account can be linked to Google later. A new email creates a USER-role
/// account whose username is the provider display name and which has no
/// password hash.
pub async fn upsert_google_user(
    store: &dyn UserStore,
    assertion: &IdentityAssertion,
) -> anyhow::Result<User> {
    let email = assertion.email.trim().to_lowercase();

    if let Some(existing) = store.find_by_email(&email).await? {
        let user = store
            .link_google(
                existing.id,
                &assertion.external_id,
                assertion.avatar_url.as_deref(),
            )
            .await?;
        info!(user_id = %user.id, "google identity linked to existing account");
        return Ok(user);
    }

    let user = store
        .create_from_google(
            assertion.display_name.trim(),
            &email,
            &assertion.external_id,
            assertion.avatar_url.as_deref(),
        )
        .await?;
    info!(user_id = %user.id, "user created from google sign-in");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use crate::auth::store::MemoryUserStore;

    fn assertion() -> IdentityAssertion {
        IdentityAssertion {
            external_id: "google-123".into(),
            email: "Sam@Example.com".into(),
            display_name: "  Sam Porter  ".into(),
            avatar_url: Some("https://lh3.example/avatar.png".into()),
        }
    }

    #[tokio::test]
    async fn first_sign_in_creates_user_without_password() {
        let store = MemoryUserStore::new();
        let user = upsert_google_user(&store, &assertion()).await.unwrap();

        assert_eq!(user.email, "sam@example.com");
        assert_eq!(user.username, "Sam Porter");
        assert_eq!(user.google_id.as_deref(), Some("google-123"));
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.is_none());
    }

    #[tokio::test]
    async fn repeat_sign_in_refreshes_profile_but_keeps_identity() {
        let store = MemoryUserStore::new();
        let first = upsert_google_user(&store, &assertion()).await.unwrap();

        let mut changed = assertion();
        changed.display_name = "Sam P. Renamed".into();
        changed.avatar_url = Some("https://lh3.example/new.png".into());
        let second = upsert_google_user(&store, &changed).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.username, "Sam Porter");
        assert_eq!(second.role, first.role);
        assert_eq!(second.avatar_url.as_deref(), Some("https://lh3.example/new.png"));
        assert_eq!(second.google_id.as_deref(), Some("google-123"));
    }

    #[tokio::test]
    async fn sign_in_links_to_existing_password_account() {
        let store = MemoryUserStore::new();
        let local = store
            .create("sam", "sam@example.com", "$argon2$hash")
            .await
            .unwrap();

        let linked = upsert_google_user(&store, &assertion()).await.unwrap();

        assert_eq!(linked.id, local.id);
        assert_eq!(linked.username, "sam");
        assert_eq!(linked.password_hash.as_deref(), Some("$argon2$hash"));
        assert_eq!(linked.google_id.as_deref(), Some("google-123"));
    }
}
