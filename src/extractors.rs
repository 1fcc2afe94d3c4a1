//! Authentication Extractors
//!
//! Axum extractors for validated request bodies and the session cookie.

use crate::cookie::ACCESS_TOKEN_COOKIE;
use crate::error::AuthError;
use crate::models::{AccessTokenClaims, Normalize};
use crate::state::AppState;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has been normalized and validated
///
/// Malformed JSON, missing fields, and failed validation are all rejected
/// with a 400 [`AuthError::Validation`].
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Normalize,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Rejected request body");
            AuthError::Validation("Invalid request".to_string())
        })?;

        value.normalize();
        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Raw token from the `accessToken` cookie
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Read the session cookie from request headers, if present and non-empty
    pub fn from_parts(parts: &Parts) -> Option<Self> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .map(SessionToken)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SessionToken::from_parts(parts).ok_or(AuthError::Unauthorized)
    }
}

/// Verified claims of the current session
#[derive(Debug, Clone)]
pub struct Session(pub AccessTokenClaims);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // the authorizer already verified this request
        if let Some(claims) = parts.extensions.get::<AccessTokenClaims>() {
            return Ok(Session(claims.clone()));
        }

        let SessionToken(token) = SessionToken::from_request_parts(parts, state).await?;
        let claims = state.auth.tokens().verify(&token).map_err(|err| {
            tracing::debug!(error = %err, "Session cookie rejected");
            AuthError::InvalidToken
        })?;

        Ok(Session(claims))
    }
}
