//! Shared application state.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::middleware::{AuthenticationEntryPoint, JsonEntryPoint};
use crate::password::{Argon2Hashing, PasswordHashing};
use crate::policy::Policy;
use crate::service::AuthService;
use crate::store::PrincipalStore;

use std::sync::Arc;

/// State handed to every handler and to the authorizer
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub policy: Arc<Policy>,
    pub entry_point: Arc<dyn AuthenticationEntryPoint>,
    pub config: Arc<AuthConfig>,
}

impl AppState {
    /// Assemble state with Argon2id hashing, the platform policy and JSON 401s
    pub fn new(config: AuthConfig, store: Arc<dyn PrincipalStore>) -> Result<Self, AuthError> {
        let hasher: Arc<dyn PasswordHashing> = Arc::new(Argon2Hashing::from_config(&config)?);
        let auth = AuthService::new(&config, store, hasher);

        Ok(Self {
            auth: Arc::new(auth),
            policy: Arc::new(Policy::platform()),
            entry_point: Arc::new(JsonEntryPoint),
            config: Arc::new(config),
        })
    }

    /// Replace the route policy
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replace how unauthenticated requests are answered
    pub fn with_entry_point(mut self, entry_point: Arc<dyn AuthenticationEntryPoint>) -> Self {
        self.entry_point = entry_point;
        self
    }
}
