//! Authentication Models
//!
//! Principals, request and response DTOs, and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ============================================
// Roles
// ============================================

/// Access class of a principal. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Business,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Business => "BUSINESS",
        }
    }

    /// Whether this role is one of `allowed`
    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "BUSINESS" => Ok(Role::Business),
            other => Err(format!("unknown role {other}")),
        }
    }
}

// ============================================
// Principals
// ============================================

/// Profile attributes captured at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    User {
        name: Option<String>,
    },
    Business {
        name: String,
        company_name: String,
        company_email: Option<String>,
        address: Option<String>,
        city: Option<String>,
        state: Option<String>,
        country: Option<String>,
    },
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::User { .. } => Role::User,
            Profile::Business { .. } => Role::Business,
        }
    }
}

/// A registered account as held by the persistence collaborator
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

/// Account to be created; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

impl NewPrincipal {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

// ============================================
// Normalization
// ============================================

/// Trim and lower-case an email so lookups are insensitive to both
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Canonicalizes a request body before it is validated
pub trait Normalize {
    fn normalize(&mut self) {}
}

fn normalize_opt_email(email: &mut Option<String>) {
    if let Some(value) = email.as_mut() {
        *value = normalize_email(value);
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ============================================
// Request DTOs
// ============================================

/// Login request, shared by users and businesses
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Normalize for LoginRequest {
    fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
    }
}

/// Individual user registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserRegistrationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

impl Normalize for UserRegistrationRequest {
    fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
        self.name = self
            .name
            .take()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }
}

/// Business account registration
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRegistrationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 200, message = "Company name must be 1-200 characters"))]
    pub company_name: String,

    #[validate(email(message = "Invalid company email format"))]
    pub company_email: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Normalize for BusinessRegistrationRequest {
    fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
        normalize_opt_email(&mut self.company_email);
        self.name = self.name.trim().to_string();
        self.company_name = self.company_name.trim().to_string();
    }
}

impl BusinessRegistrationRequest {
    pub fn profile(&self) -> Profile {
        Profile::Business {
            name: self.name.clone(),
            company_name: self.company_name.clone(),
            company_email: self.company_email.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
    }
}

/// Change password request (for the principal behind the session cookie)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

impl Normalize for ChangePasswordRequest {}

/// Ask for an email verification code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerificationCodeRequest {
    #[validate(custom(function = "not_blank", message = "Email is required"))]
    pub email: String,
}

impl Normalize for VerificationCodeRequest {
    fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
    }
}

/// Submit an email verification code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(custom(function = "not_blank", message = "Email is required"))]
    pub email: String,

    #[validate(custom(function = "not_blank", message = "Code is required"))]
    pub code: String,
}

impl Normalize for VerifyCodeRequest {
    fn normalize(&mut self) {
        self.email = normalize_email(&self.email);
        self.code = self.code.trim().to_string();
    }
}

// ============================================
// Response DTOs
// ============================================

/// Identity key of a principal in response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Identity {
    #[serde(rename = "userId")]
    User(Uuid),
    #[serde(rename = "bid")]
    Business(Uuid),
}

impl Identity {
    pub fn of(principal: &Principal) -> Self {
        match principal.role {
            Role::User => Identity::User(principal.id),
            Role::Business => Identity::Business(principal.id),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Identity::User(id) | Identity::Business(id) => *id,
        }
    }
}

/// Body returned by login and registration. Never carries the token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub message: String,
    #[serde(flatten)]
    pub identity: Identity,
    pub email: String,
    pub role: Role,
}

impl AuthResponse {
    pub fn new(message: impl Into<String>, principal: &Principal) -> Self {
        Self {
            message: message.into(),
            identity: Identity::of(principal),
            email: principal.email.clone(),
            role: principal.role,
        }
    }
}

/// Body of `GET /auth/me`, keyed like [`AuthResponse`]
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub identity: Identity,
    pub email: String,
    pub role: Role,
}

impl From<&AccessTokenClaims> for SessionResponse {
    fn from(claims: &AccessTokenClaims) -> Self {
        Self {
            identity: claims.identity(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (principal ID)
    pub sub: Uuid,
    /// Principal email
    pub email: String,
    /// Principal role
    pub role: Role,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: Uuid,
}

impl AccessTokenClaims {
    pub fn identity(&self) -> Identity {
        match self.role {
            Role::User => Identity::User(self.sub),
            Role::Business => Identity::Business(self.sub),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        let profile = match role {
            Role::User => Profile::User { name: None },
            Role::Business => Profile::Business {
                name: "Ada".into(),
                company_name: "Analytical Engines".into(),
                company_email: None,
                address: None,
                city: None,
                state: None,
                country: None,
            },
        };
        Principal {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            role,
            password_hash: "digest".into(),
            profile,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_email_is_idempotent() {
        let once = normalize_email("  Ada@Example.COM ");
        assert_eq!(once, "ada@example.com");
        assert_eq!(normalize_email(&once), once);
    }

    #[test]
    fn test_login_request_normalizes_before_validation() {
        let mut req = LoginRequest {
            email: " A@B.com ".into(),
            password: "secret".into(),
        };
        assert!(req.validate().is_err());

        req.normalize();
        assert_eq!(req.email, "a@b.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(Role::Business).unwrap(), "BUSINESS");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_is_any_of() {
        assert!(Role::User.is_any_of(&Role::ALL));
        assert!(!Role::User.is_any_of(&[Role::Business]));
        assert!(!Role::Business.is_any_of(&[]));
    }

    #[test]
    fn test_auth_response_uses_identity_key_per_role() {
        let user = principal(Role::User);
        let body = serde_json::to_value(AuthResponse::new("Login successful", &user)).unwrap();
        assert_eq!(body["userId"], user.id.to_string());
        assert!(body.get("bid").is_none());
        assert_eq!(body["role"], "USER");

        let business = principal(Role::Business);
        let body = serde_json::to_value(AuthResponse::new("Login successful", &business)).unwrap();
        assert_eq!(body["bid"], business.id.to_string());
        assert!(body.get("userId").is_none());
    }

    #[test]
    fn test_session_response_matches_login_keys() {
        let business = principal(Role::Business);
        let claims = AccessTokenClaims {
            sub: business.id,
            email: business.email.clone(),
            role: Role::Business,
            iat: 0,
            exp: 1800,
            iss: "arbeit".into(),
            aud: "arbeit-api".into(),
            jti: Uuid::new_v4(),
        };

        let body = serde_json::to_value(SessionResponse::from(&claims)).unwrap();
        assert_eq!(body["bid"], business.id.to_string());
        assert_eq!(body["role"], "BUSINESS");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn test_verify_code_rejects_blank_fields() {
        let req = VerifyCodeRequest {
            email: "a@b.com".into(),
            code: "   ".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_business_request_reads_camel_case() {
        let req: BusinessRegistrationRequest = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "hunter22",
            "companyName": "Analytical Engines",
            "companyEmail": "Office@Example.com",
            "city": "London"
        }))
        .unwrap();
        assert_eq!(req.company_name, "Analytical Engines");
        assert_eq!(req.company_email.as_deref(), Some("Office@Example.com"));
    }
}
