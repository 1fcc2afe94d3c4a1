//! Authentication HTTP Handlers
//!
//! REST endpoints for login, registration, logout, password change, and
//! email verification, plus the public info routes.

use crate::cookie::{clear_session_cookie, session_cookie};
use crate::cors::cors_layer;
use crate::error::{ActionError, AuthError};
use crate::extractors::{Session, ValidatedJson};
use crate::middleware;
use crate::models::*;
use crate::state::AppState;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tower_http::trace::TraceLayer;

// ============================================
// Route Builder
// ============================================

/// Routes under `/auth`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login_user))
        .route("/auth/register", post(register_user))
        .route("/auth/business/login", post(login_business))
        .route("/auth/business/register", post(register_business))
        .route("/auth/logout", post(logout))
        .route("/auth/change-password", post(change_password))
        .route("/auth/verify-email", post(request_verification).put(confirm_verification))
        .route("/auth/me", get(current_principal))
}

/// Root, API index and health check
pub fn info_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/", get(root))
        .route("/health", get(health))
}

/// Mount the auth surface and the platform's `downstream` routes behind the
/// authorizer, CORS and request tracing
pub fn build_app(state: AppState, downstream: Router<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(auth_routes())
        .merge(info_routes())
        .merge(downstream)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::authorize,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================
// Login / Logout
// ============================================

async fn login(
    state: &AppState,
    jar: CookieJar,
    role: Role,
    req: LoginRequest,
) -> Result<(CookieJar, Json<AuthResponse>), AuthError> {
    let outcome = state.auth.login(role, req).await?;
    let cookie = session_cookie(outcome.token, state.auth.tokens().ttl(), &state.config.cookie);

    Ok((
        jar.add(cookie),
        Json(AuthResponse::new("Login successful", &outcome.principal)),
    ))
}

/// POST /auth/login
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Result<ValidatedJson<LoginRequest>, AuthError>,
) -> Result<impl IntoResponse, ActionError> {
    let ValidatedJson(req) = req.map_err(|e| e.during("Login failed"))?;
    login(&state, jar, Role::User, req)
        .await
        .map_err(|e| e.during("Login failed"))
}

/// POST /auth/business/login
pub async fn login_business(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Result<ValidatedJson<LoginRequest>, AuthError>,
) -> Result<impl IntoResponse, ActionError> {
    let ValidatedJson(req) = req.map_err(|e| e.during("Business login failed"))?;
    login(&state, jar, Role::Business, req)
        .await
        .map_err(|e| e.during("Business login failed"))
}

/// POST /auth/logout
///
/// Always succeeds. The token itself stays valid until it expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    tracing::debug!("Clearing session cookie");
    (
        jar.add(clear_session_cookie(&state.config.cookie)),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

// ============================================
// Registration
// ============================================

/// POST /auth/register
pub async fn register_user(
    State(state): State<AppState>,
    req: Result<ValidatedJson<UserRegistrationRequest>, AuthError>,
) -> Result<impl IntoResponse, ActionError> {
    let action = "Registration failed";
    let ValidatedJson(req) = req.map_err(|e| e.during(action))?;
    let principal = state.auth.register_user(req).await.map_err(|e| e.during(action))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Registration successful", &principal)),
    ))
}

/// POST /auth/business/register
pub async fn register_business(
    State(state): State<AppState>,
    req: Result<ValidatedJson<BusinessRegistrationRequest>, AuthError>,
) -> Result<impl IntoResponse, ActionError> {
    let action = "Business registration failed";
    let ValidatedJson(req) = req.map_err(|e| e.during(action))?;
    let principal = state
        .auth
        .register_business(req)
        .await
        .map_err(|e| e.during(action))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Business registration successful", &principal)),
    ))
}

// ============================================
// Password Management
// ============================================

/// POST /auth/change-password
///
/// The session is extracted before the body, so a missing cookie is a 401
/// whatever the body holds.
pub async fn change_password(
    State(state): State<AppState>,
    Session(claims): Session,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.change_password(&claims, req).await?;

    Ok(Json(MessageResponse::new("Password updated")))
}

// ============================================
// Email Verification
// ============================================

/// POST /auth/verify-email
pub async fn request_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerificationCodeRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.request_email_verification(req).await?;

    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// PUT /auth/verify-email
pub async fn confirm_verification(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyCodeRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.auth.confirm_email_verification(req).await?;

    Ok(Json(MessageResponse::new("Email verified")))
}

// ============================================
// Session
// ============================================

/// GET /auth/me
pub async fn current_principal(Session(claims): Session) -> impl IntoResponse {
    Json(SessionResponse::from(&claims))
}

// ============================================
// Info
// ============================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
