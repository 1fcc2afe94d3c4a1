//! Service Configuration
//!
//! All configuration values are loaded from environment variables once at
//! startup and then passed explicitly to the components that need them.

use crate::error::AuthError;
use std::env;
use std::net::SocketAddr;

/// Default token validity window in seconds
pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 1800;

/// Longest accepted token validity window in seconds
pub const MAX_ACCESS_TOKEN_TTL: i64 = 86_400;

/// Origins allowed when `CORS_ALLOWED_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:30080"];

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Access token lifetime in seconds (from ACCESS_TOKEN_TTL env var)
    pub access_token_ttl: i64,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    pub cookie: CookieConfig,

    pub cors: CorsConfig,

    pub server: ServerConfig,
}

/// Attributes of the session cookie that vary per deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie `Domain` attribute (from COOKIE_DOMAIN); `None` keeps the cookie host-only
    pub domain: Option<String>,

    /// Cookie `Secure` attribute (from COOKIE_SECURE); must be true behind TLS
    pub secure: bool,
}

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfig {
    /// `*`: any origin, credentials disabled
    Any,
    /// Explicit list, credentials enabled
    Origins(Vec<String>),
}

impl CorsConfig {
    /// Parse a comma-separated origin list as found in CORS_ALLOWED_ORIGINS
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).unwrap_or_default();

        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        // a wildcard anywhere in the list wins
        if origins.iter().any(|origin| origin == "*") {
            return CorsConfig::Any;
        }

        if origins.is_empty() {
            CorsConfig::default()
        } else {
            CorsConfig::Origins(origins)
        }
    }

    pub fn allows_credentials(&self) -> bool {
        matches!(self, CorsConfig::Origins(_))
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig::Origins(DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect())
    }
}

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (from HOST env var)
    pub host: String,

    /// Bind port (from PORT env var)
    pub port: u16,

    /// PostgreSQL connection string (from DATABASE_URL); in-memory store when absent
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, AuthError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| AuthError::Config(format!("Invalid bind address {}:{}", self.host, self.port)))
    }
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is honoured if present.
    pub fn from_env() -> Result<Self, AuthError> {
        let _ = dotenvy::dotenv();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET environment variable must be set".to_string()))?;

        Ok(Self {
            jwt_secret,

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "arbeit".to_string()),

            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "arbeit-api".to_string()),

            access_token_ttl: parsed("ACCESS_TOKEN_TTL", DEFAULT_ACCESS_TOKEN_TTL),

            argon2_memory_cost: parsed("ARGON2_MEMORY_COST", 65536), // 64 MiB

            argon2_time_cost: parsed("ARGON2_TIME_COST", 3),

            argon2_parallelism: parsed("ARGON2_PARALLELISM", 4),

            min_password_length: parsed("MIN_PASSWORD_LENGTH", 8),

            cookie: CookieConfig {
                domain: env::var("COOKIE_DOMAIN")
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
                secure: env::var("COOKIE_SECURE")
                    .ok()
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },

            cors: CorsConfig::parse(env::var("CORS_ALLOWED_ORIGINS").ok().as_deref()),

            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("PORT", 8080),
                database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            },
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if !(1..=MAX_ACCESS_TOKEN_TTL).contains(&self.access_token_ttl) {
            return Err(AuthError::Config(format!(
                "ACCESS_TOKEN_TTL must be between 1 and {MAX_ACCESS_TOKEN_TTL} seconds"
            )));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a".repeat(32),
            jwt_issuer: "test".to_string(),
            jwt_audience: "test".to_string(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            min_password_length: 8,
            cookie: CookieConfig::default(),
            cors: CorsConfig::default(),
            server: ServerConfig::default(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_argon2_params() {
        let config = AuthConfig {
            argon2_parallelism: 0,
            ..config()
        };

        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_cors_defaults_to_local_origins() {
        assert_eq!(
            CorsConfig::parse(None),
            CorsConfig::Origins(vec![
                "http://localhost:3000".to_string(),
                "http://localhost:30080".to_string(),
            ])
        );
        assert_eq!(CorsConfig::parse(Some("  ")), CorsConfig::default());
    }

    #[test]
    fn test_config_validation_bounds_token_ttl() {
        for ttl in [0, -1, MAX_ACCESS_TOKEN_TTL + 1, i64::MAX] {
            let config = AuthConfig {
                access_token_ttl: ttl,
                ..config()
            };
            assert!(matches!(config.validate(), Err(AuthError::Config(_))), "{ttl}");
        }

        let config = AuthConfig {
            access_token_ttl: MAX_ACCESS_TOKEN_TTL,
            ..config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cors_wildcard_in_list_means_any() {
        let cors = CorsConfig::parse(Some("http://localhost:3000, *"));
        assert_eq!(cors, CorsConfig::Any);
        assert!(!cors.allows_credentials());
    }

    #[test]
    fn test_cors_wildcard_disables_credentials() {
        let cors = CorsConfig::parse(Some("*"));
        assert_eq!(cors, CorsConfig::Any);
        assert!(!cors.allows_credentials());
    }

    #[test]
    fn test_cors_origin_list_is_trimmed() {
        let cors = CorsConfig::parse(Some("https://a.example, https://b.example ,"));
        assert_eq!(
            cors,
            CorsConfig::Origins(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string(),
            ])
        );
        assert!(cors.allows_credentials());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            database_url: None,
        };
        assert_eq!(server.bind_addr().unwrap().port(), 9000);
    }
}
