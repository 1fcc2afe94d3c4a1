//! Session token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs. There is no server-side session store and
//! no revocation list: a token stays valid until its `exp`, even after logout
//! clears the cookie on the client.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{AccessTokenClaims, Principal};

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Signs and verifies session tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl: config.access_token_ttl,
        }
    }

    /// Token lifetime in seconds
    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    /// Issue a token for `principal` valid from now
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Issue a token for `principal` as if the current time were `now`
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<String, AuthError> {
        let exp = now.checked_add(self.ttl).ok_or_else(|| {
            tracing::error!(ttl = self.ttl, "Token expiry overflows");
            AuthError::Internal
        })?;

        let claims = AccessTokenClaims {
            sub: principal.id,
            email: principal.email.clone(),
            role: principal.role,
            iat: now,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify signature, issuer, audience and expiry against the wall clock
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now`
    ///
    /// A token is valid while `now < exp`; no leeway is granted.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        validation.leeway = 0;
        // expiry is checked below against the supplied clock
        validation.validate_exp = false;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims;

        if now >= claims.exp {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, "Session token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
