//! HTTP error mapping.
//!
//! Every failure becomes `{"error": "<message>"}` with a status drawn
//! from the auth error taxonomy. Internal failures are logged with
//! their detail but reported to the client as a generic 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use embedauth_auth::AuthError;
use serde_json::json;
use tracing::error;

/// Wrapper giving [`AuthError`] an HTTP representation.
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AuthError::MissingApiKey
            | AuthError::UnknownTenant
            | AuthError::InvalidCredentials
            | AuthError::InvalidOrExpiredSession => StatusCode::UNAUTHORIZED,
            AuthError::OriginNotAllowed => StatusCode::FORBIDDEN,
            AuthError::MissingFields
            | AuthError::PasswordTooShort
            | AuthError::ProjectNameRequired => StatusCode::BAD_REQUEST,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::ProjectNotFound => StatusCode::NOT_FOUND,
            AuthError::Crypto(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(detail = %self.0, "internal error");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
