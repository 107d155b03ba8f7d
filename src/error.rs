use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API-level errors with stable machine-readable codes.
///
/// Every variant maps to one HTTP status plus a JSON body of the shape
/// `{ "error": <message>, "code": <CODE> }`. Infrastructure faults collapse
/// into `Internal` and surface as a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingField(&'static str),
    #[error("Password must be at least 6 characters")]
    WeakPassword,
    #[error("User already exists")]
    DuplicateUser,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("This account uses Google login. Please use Google OAuth.")]
    GoogleAccountOnly,
    #[error("Not authorized, no token")]
    NoToken,
    #[error("Not authorized, token invalid or expired")]
    InvalidToken,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Admin access required")]
    AdminOnly,
    #[error("Login failed")]
    OAuthFailure,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Something went wrong")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::WeakPassword | ApiError::DuplicateUser => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::GoogleAccountOnly
            | ApiError::NoToken
            | ApiError::InvalidToken
            | ApiError::NotAuthenticated
            | ApiError::OAuthFailure => StatusCode::UNAUTHORIZED,
            ApiError::AdminOnly => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::WeakPassword => "WEAK_PASSWORD",
            ApiError::DuplicateUser => "DUPLICATE_USER",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::GoogleAccountOnly => "GOOGLE_ACCOUNT",
            ApiError::NoToken => "NO_TOKEN",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::NotAuthenticated => "NOT_AUTHENTICATED",
            ApiError::AdminOnly => "ADMIN_ONLY",
            ApiError::OAuthFailure => "OAUTH_FAILED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "SERVER_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            error!(error = %source, "internal server error");
        }
        let body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::MissingField("Please provide all required fields").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::WeakPassword.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateUser.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NoToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AdminOnly.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("Dog").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_field_message_is_caller_chosen() {
        let err = ApiError::MissingField("Please provide email and password");
        assert_eq!(err.to_string(), "Please provide email and password");
        assert_eq!(err.code(), "MISSING_FIELD");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::NoToken.code(), "NO_TOKEN");
        assert_eq!(ApiError::InvalidToken.code(), "INVALID_TOKEN");
        assert_eq!(ApiError::AdminOnly.code(), "ADMIN_ONLY");
        assert_eq!(ApiError::GoogleAccountOnly.code(), "GOOGLE_ACCOUNT");
        assert_eq!(ApiError::OAuthFailure.code(), "OAUTH_FAILED");
    }

    #[test]
    fn internal_message_hides_the_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3"));
        assert_eq!(err.to_string(), "Something went wrong");
    }

    #[test]
    fn credential_error_does_not_mention_email() {
        // The login failure must not reveal whether the email existed.
        let msg = ApiError::InvalidCredentials.to_string();
        assert_eq!(msg, "Invalid credentials");
        assert!(!msg.to_lowercase().contains("email"));
    }
}
