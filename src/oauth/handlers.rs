use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::JwtKeys,
    oauth::upsert_google_user,
    state::AppState,
};

pub fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google", get(google_start))
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/login/failed", get(login_failed))
}

/// Kick off the flow: send the browser to the provider's consent page.
pub async fn google_start(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.identity.authorize_url())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// Provider redirect target. Exchanges the code for an identity, links or
/// creates the local user, and redirects onwards with a freshly issued token.
/// Every failure path lands on the dedicated failure endpoint; nothing is
/// retried.
#[instrument(skip(state, query))]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let Some(code) = query.code.as_deref() else {
        warn!("oauth callback without code");
        return Redirect::temporary("/api/auth/login/failed");
    };

    let assertion = match state.identity.fetch_identity(code).await {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "oauth identity fetch failed");
            return Redirect::temporary("/api/auth/login/failed");
        }
    };

    let user = match upsert_google_user(state.users.as_ref(), &assertion).await {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "oauth user upsert failed");
            return Redirect::temporary("/api/auth/login/failed");
        }
    };

    let token = match JwtKeys::from_ref(&state).sign(&user) {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "oauth token issue failed");
            return Redirect::temporary("/api/auth/login/failed");
        }
    };

    info!(user_id = %user.id, "google sign-in complete");
    Redirect::temporary(&format!(
        "{}?token={}",
        state.config.google.success_redirect, token
    ))
}

pub async fn login_failed() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": "Login failed",
            "code": "OAUTH_FAILED",
        })),
    )
}
