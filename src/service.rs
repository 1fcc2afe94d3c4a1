//! Authentication Service
//!
//! Credential verification, registration, password change, and the email
//! verification placeholder. Handlers only translate HTTP to and from these
//! calls.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::PasswordHashing;
use crate::store::PrincipalStore;
use crate::token::TokenIssuer;

use std::sync::Arc;

/// A successful login: the principal and the token to put in its cookie
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub token: String,
}

/// Authentication service
pub struct AuthService {
    store: Arc<dyn PrincipalStore>,
    hasher: Arc<dyn PasswordHashing>,
    tokens: TokenIssuer,
    min_password_length: usize,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn PrincipalStore>,
        hasher: Arc<dyn PasswordHashing>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens: TokenIssuer::new(config),
            min_password_length: config.min_password_length,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Validate password strength
    pub fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }

    // ============================================
    // Login
    // ============================================

    /// Verify credentials for a principal of `role` and issue a session token
    pub async fn login(&self, role: Role, req: LoginRequest) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(&req.email);

        let principal = match self.store.find_by_email(role, &email).await? {
            Some(principal) => principal,
            None => {
                tracing::warn!(%role, "Login attempt for unknown account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&req.password, &principal.password_hash)? {
            tracing::warn!(principal_id = %principal.id, %role, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&principal)?;

        tracing::info!(principal_id = %principal.id, %role, "Login successful");
        Ok(LoginOutcome { principal, token })
    }

    // ============================================
    // Registration
    // ============================================

    async fn register(&self, email: &str, password: &str, profile: Profile) -> Result<Principal, AuthError> {
        self.validate_password(password)?;

        let email = normalize_email(email);
        let role = profile.role();

        if self.store.find_by_email(role, &email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hasher.hash(password)?;

        // the store enforces uniqueness again for concurrent registrations
        let principal = self
            .store
            .create(NewPrincipal {
                email,
                password_hash,
                profile,
            })
            .await?;

        tracing::info!(principal_id = %principal.id, %role, "Principal registered");
        Ok(principal)
    }

    /// Register an individual user
    pub async fn register_user(&self, req: UserRegistrationRequest) -> Result<Principal, AuthError> {
        self.register(&req.email, &req.password, Profile::User { name: req.name.clone() })
            .await
    }

    /// Register a business account
    pub async fn register_business(
        &self,
        req: BusinessRegistrationRequest,
    ) -> Result<Principal, AuthError> {
        let profile = req.profile();
        self.register(&req.email, &req.password, profile).await
    }

    // ============================================
    // Session lookups
    // ============================================

    /// Load the principal a verified session refers to
    pub async fn principal_for(&self, claims: &AccessTokenClaims) -> Result<Principal, AuthError> {
        self.store
            .find_by_id(claims.role, claims.sub)
            .await?
            .ok_or(AuthError::NotFound)
    }

    // ============================================
    // Password Management
    // ============================================

    /// Change password for the principal behind a verified session
    pub async fn change_password(
        &self,
        claims: &AccessTokenClaims,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let principal = self.principal_for(claims).await?;

        if !self.hasher.verify(&req.current_password, &principal.password_hash)? {
            return Err(AuthError::Domain("Current password is incorrect".to_string()));
        }

        self.validate_password(&req.new_password)?;

        let password_hash = self.hasher.hash(&req.new_password)?;
        self.store
            .update_password(principal.role, principal.id, &password_hash)
            .await?;

        tracing::info!(principal_id = %principal.id, role = %principal.role, "Password changed");
        Ok(())
    }

    // ============================================
    // Email Verification
    // ============================================

    // TODO: replace with real code issuance (stored code, expiry, attempt limit) once mail delivery exists

    /// Request a verification code. Nothing is sent.
    pub async fn request_email_verification(&self, req: VerificationCodeRequest) -> Result<(), AuthError> {
        tracing::debug!(email = %req.email, "Email verification requested (not delivered)");
        Ok(())
    }

    /// Submit a verification code. Any non-blank code is accepted.
    pub async fn confirm_email_verification(&self, req: VerifyCodeRequest) -> Result<(), AuthError> {
        tracing::debug!(email = %req.email, "Email verification code accepted without checking");
        Ok(())
    }
}
