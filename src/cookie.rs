//! Session cookie construction.

use crate::config::CookieConfig;

use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

fn base(value: String, max_age: i64, config: &CookieConfig) -> Cookie<'static> {
    let mut builder = Cookie::build((ACCESS_TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(time::Duration::seconds(max_age));

    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }

    builder.build()
}

/// Cookie carrying a freshly issued token for `max_age` seconds
pub fn session_cookie(token: String, max_age: i64, config: &CookieConfig) -> Cookie<'static> {
    base(token, max_age, config)
}

/// Cookie that overwrites the session cookie with an empty, already-expired value
pub fn clear_session_cookie(config: &CookieConfig) -> Cookie<'static> {
    base(String::new(), 0, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".into(), 1800, &CookieConfig::default());
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("accessToken=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=1800"));
        assert!(!rendered.contains("Secure"));
        assert!(!rendered.contains("Domain"));
    }

    #[test]
    fn test_domain_and_secure_follow_config() {
        let config = CookieConfig {
            domain: Some("arbeit.example".into()),
            secure: true,
        };
        let rendered = session_cookie("tok".into(), 1800, &config).to_string();

        assert!(rendered.contains("Domain=arbeit.example"));
        assert!(rendered.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&CookieConfig::default());

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
