//! Arbeit Authentication Service
//!
//! Session and authentication boundary for the Arbeit platform, providing:
//! - User and business login and registration
//! - Stateless JWT sessions carried in an HTTP-only `accessToken` cookie
//! - Argon2id password hashing
//! - Password change for the signed-in principal
//! - Email verification (placeholder flow, no delivery)
//! - Route authorization by URL pattern, method and role
//!
//! Sessions are not revocable: logout clears the cookie, but a copied token
//! keeps verifying until its `exp`.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables (or `.env`):
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ISSUER` - JWT issuer claim (default: "arbeit")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "arbeit-api")
//! - `ACCESS_TOKEN_TTL` - Token and cookie lifetime in seconds (default: 1800)
//! - `ARGON2_MEMORY_COST`, `ARGON2_TIME_COST`, `ARGON2_PARALLELISM` - Argon2id parameters
//! - `MIN_PASSWORD_LENGTH` - Minimum password length (default: 8)
//! - `COOKIE_DOMAIN` - Session cookie domain (default: host-only)
//! - `COOKIE_SECURE` - Mark the session cookie `Secure` (default: false)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins, or `*`
//! - `HOST`, `PORT` - Bind address (default: 0.0.0.0:8080)
//! - `DATABASE_URL` - PostgreSQL connection string (default: in-memory store)
//!
//! # Usage
//!
//! ```rust,ignore
//! use arbeit_auth::{build_app, AppState, AuthConfig, MemoryStore};
//!
//! let config = AuthConfig::from_env()?;
//! let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
//! let app = build_app(state, platform_routes);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod cookie;
pub mod cors;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod service;
pub mod state;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{Session, SessionToken, ValidatedJson};
pub use handlers::build_app;
pub use middleware::{AuthenticationEntryPoint, JsonEntryPoint};
pub use models::*;
pub use policy::{Access, Policy};
pub use service::AuthService;
pub use state::AppState;
pub use store::{MemoryStore, PgStore, PrincipalStore};
pub use token::TokenIssuer;
