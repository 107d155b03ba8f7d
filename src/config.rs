use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    /// Where the OAuth callback redirects after a successful sign-in; the
    /// issued token is appended as a `token` query parameter.
    pub success_redirect: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let google = GoogleConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            callback_url: std::env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/auth/google/callback".into()),
            success_redirect: std::env::var("OAUTH_SUCCESS_REDIRECT")
                .unwrap_or_else(|_| "http://localhost:8080/".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            google,
        })
    }
}
