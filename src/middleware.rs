//! Authentication Middleware
//!
//! The per-request authorizer. Each request is matched against the route
//! policy; protected routes need a valid session cookie whose role the
//! matched rule permits. Verified claims are stored in request extensions
//! for the [`Session`](crate::extractors::Session) extractor.

use crate::error::AuthError;
use crate::extractors::SessionToken;
use crate::policy::Access;
use crate::state::AppState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Decides the response for requests that lack a usable session
pub trait AuthenticationEntryPoint: Send + Sync {
    fn commence(&self, error: AuthError) -> Response;
}

/// Answers with the standard JSON error body and a 401 status
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEntryPoint;

impl AuthenticationEntryPoint for JsonEntryPoint {
    fn commence(&self, error: AuthError) -> Response {
        error.into_response()
    }
}

/// Enforce the route policy
pub async fn authorize(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let access = state.policy.evaluate(req.method(), req.uri().path());

    let (mut parts, body) = req.into_parts();
    let token = SessionToken::from_parts(&parts);

    if !access.requires_session() {
        // public routes still get claims when a valid cookie is sent
        if let Some(claims) = token.and_then(|SessionToken(t)| state.auth.tokens().verify(&t).ok()) {
            parts.extensions.insert(claims);
        }
        return next.run(Request::from_parts(parts, body)).await;
    }

    let Some(SessionToken(token)) = token else {
        tracing::debug!(path = %parts.uri.path(), "No session cookie on protected route");
        return state.entry_point.commence(AuthError::Unauthorized);
    };

    let claims = match state.auth.tokens().verify(&token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(path = %parts.uri.path(), error = %err, "Session token rejected");
            return state.entry_point.commence(AuthError::InvalidToken);
        }
    };

    if let Access::AnyRole(_) = access {
        if !access.permits(claims.role) {
            tracing::debug!(
                principal_id = %claims.sub,
                role = %claims.role,
                path = %parts.uri.path(),
                "Role not permitted for route"
            );
            return AuthError::Forbidden.into_response();
        }
    }

    parts.extensions.insert(claims);
    next.run(Request::from_parts(parts, body)).await
}
