use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::GoogleConfig;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Verified third-party identity, as handed to the bridge.
#[derive(Debug, Clone)]
pub struct IdentityAssertion {
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Seam between the OAuth flow and a live provider. The callback handler only
/// ever sees this trait, so tests swap in a canned implementation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider page the sign-in flow redirects the browser to.
    fn authorize_url(&self) -> String;

    /// Exchange the authorization code for a verified identity assertion.
    async fn fetch_identity(&self, code: &str) -> anyhow::Result<IdentityAssertion>;
}

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl GoogleProvider {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    name: String,
    picture: Option<String>,
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self) -> String {
        let mut url = Url::parse(GOOGLE_AUTHORIZE_URL).expect("static url parses");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "profile email");
        url.into()
    }

    async fn fetch_identity(&self, code: &str) -> anyhow::Result<IdentityAssertion> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("google token exchange request")?
            .error_for_status()
            .context("google token exchange status")?
            .json()
            .await
            .context("google token exchange body")?;

        let info: UserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("google userinfo request")?
            .error_for_status()
            .context("google userinfo status")?
            .json()
            .await
            .context("google userinfo body")?;

        debug!(google_id = %info.sub, "fetched google identity");
        Ok(IdentityAssertion {
            external_id: info.sub,
            email: info.email,
            display_name: info.name,
            avatar_url: info.picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> GoogleProvider {
        GoogleProvider::new(&GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            callback_url: "http://localhost:8080/api/auth/google/callback".into(),
            success_redirect: "http://localhost:8080/".into(),
        })
    }

    #[test]
    fn authorize_url_carries_client_and_callback() {
        let url = Url::parse(&make_provider().authorize_url()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:8080/api/auth/google/callback"
        );
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], "profile email");
    }

    #[test]
    fn authorize_url_never_leaks_the_secret() {
        assert!(!make_provider().authorize_url().contains("shh"));
    }

    #[test]
    fn userinfo_deserializes_google_shape() {
        let info: UserInfo = serde_json::from_str(
            r#"{
                "sub": "1093847",
                "name": "Alice Example",
                "email": "alice@gmail.com",
                "picture": "https://lh3.googleusercontent.com/a/photo",
                "email_verified": true
            }"#,
        )
        .unwrap();
        assert_eq!(info.sub, "1093847");
        assert_eq!(info.email, "alice@gmail.com");
        assert_eq!(info.picture.as_deref(), Some("https://lh3.googleusercontent.com/a/photo"));
    }
}
