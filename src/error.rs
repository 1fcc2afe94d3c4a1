//! Authentication Error Types
//!
//! Centralized error handling for the authentication surface. Errors fall in
//! three tiers: request problems (400/401/403), business-rule failures from
//! collaborators (400, message passed through), and unexpected failures (500,
//! generic message only).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Text returned for every unexpected failure
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Email already registered")]
    EmailExists,

    #[error("Account not found")]
    NotFound,

    #[error("{0}")]
    Domain(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidCredentials
            | AuthError::EmailExists
            | AuthError::NotFound
            | AuthError::Domain(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthorized => "unauthorized",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Forbidden => "forbidden",
            AuthError::EmailExists => "email_exists",
            AuthError::NotFound => "not_found",
            AuthError::Domain(_) => "request_failed",
            AuthError::Database(_) | AuthError::Config(_) | AuthError::Internal => "internal_error",
        }
    }

    /// Unexpected failures whose detail must never reach the client
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }

    /// Text safe to show the caller
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Attach the name of the failed action to the client-facing message
    pub fn during(self, action: &'static str) -> ActionError {
        ActionError {
            action,
            error: self,
        }
    }
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "Request failed unexpectedly");
        }

        error_body(self.status(), self.code(), self.public_message())
    }
}

/// An [`AuthError`] raised while performing a named action, e.g. "Login failed"
#[derive(Debug, Clone, thiserror::Error)]
#[error("{action}: {error}")]
pub struct ActionError {
    pub action: &'static str,
    #[source]
    pub error: AuthError,
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        if self.error.is_internal() {
            return self.error.into_response();
        }

        let message = format!("{}: {}", self.action, self.error);
        error_body(self.error.status(), self.error.code(), message)
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AuthError::EmailExists;
            }
        }
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        AuthError::InvalidToken
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            AuthError::Validation("Invalid request".to_string())
        } else {
            AuthError::Validation(messages.join(", "))
        }
    }
}
