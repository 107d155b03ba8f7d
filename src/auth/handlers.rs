use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", get(logout))
}

/// Trim a maybe-missing field; empty after trimming counts as missing.
fn required<'a>(field: &'a Option<String>, message: &'static str) -> Result<&'a str, ApiError> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(message)),
    }
}

const REGISTER_FIELDS_MSG: &str = "Please provide all required fields";
const LOGIN_FIELDS_MSG: &str = "Please provide email and password";

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = required(&payload.username, REGISTER_FIELDS_MSG)?;
    let email = required(&payload.email, REGISTER_FIELDS_MSG)?.to_lowercase();
    let password = required(&payload.password, REGISTER_FIELDS_MSG)?;

    if password.chars().count() < 6 {
        warn!("registration rejected: password too short");
        return Err(ApiError::WeakPassword);
    }

    // Validation precedes any write; the unique indexes close the race.
    if state
        .users
        .find_by_email_or_username(&email, username)
        .await?
        .is_some()
    {
        warn!(email = %email, "registration rejected: user exists");
        return Err(ApiError::DuplicateUser);
    }

    let hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let user = state.users.create(username, &email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = required(&payload.email, LOGIN_FIELDS_MSG)?.to_lowercase();
    let password = required(&payload.password, LOGIN_FIELDS_MSG)?;

    // Unknown email and wrong password produce the same response body.
    let user = state.users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %email, "login unknown email");
        ApiError::InvalidCredentials
    })?;

    let Some(stored_hash) = user.password_hash.as_deref() else {
        warn!(user_id = %user.id, "login against OAuth-only account");
        return Err(ApiError::GoogleAccountOnly);
    };

    let ok = verify_password(password, stored_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = %claims.sub, "token subject no longer exists");
        ApiError::InvalidToken
    })?;
    Ok(Json(PublicUser::from(&user)))
}

/// Tokens are stateless, so logout is a client-side concern; this endpoint
/// just acknowledges it.
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(&None, LOGIN_FIELDS_MSG).is_err());
        assert!(required(&Some("".into()), LOGIN_FIELDS_MSG).is_err());
        assert!(required(&Some("   ".into()), LOGIN_FIELDS_MSG).is_err());
    }

    #[test]
    fn required_carries_the_given_message() {
        let err = required(&None, LOGIN_FIELDS_MSG).unwrap_err();
        assert_eq!(err.to_string(), "Please provide email and password");
        let err = required(&None, REGISTER_FIELDS_MSG).unwrap_err();
        assert_eq!(err.to_string(), "Please provide all required fields");
    }

    #[test]
    fn required_trims() {
        assert_eq!(
            required(&Some("  alice  ".into()), REGISTER_FIELDS_MSG).unwrap(),
            "alice"
        );
    }
}
