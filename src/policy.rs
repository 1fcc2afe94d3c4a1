//! Route Authorization Policy
//!
//! A static table mapping URL pattern and HTTP method to the access a request
//! needs. Rules are evaluated in order and the first match wins; requests that
//! match nothing need a valid session of any role.

use crate::models::Role;

use axum::http::Method;

/// What a request must present to pass the authorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No session required
    Public,
    /// Any valid session
    Authenticated,
    /// A valid session whose role is in the set
    AnyRole(&'static [Role]),
}

impl Access {
    /// Whether a session with `role` satisfies this access level
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::AnyRole(allowed) => role.is_any_of(allowed),
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Access::Public)
    }
}

/// Path matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Exactly this path
    Exact(&'static str),
    /// This path and everything beneath it (`/prefix/**`)
    Subtree(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(pattern) => path == *pattern,
            PathPattern::Subtree(prefix) => match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// One row of the policy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// `None` matches every method
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub access: Access,
}

impl Rule {
    pub fn any(pattern: PathPattern, access: Access) -> Self {
        Self {
            method: None,
            pattern,
            access,
        }
    }

    pub fn on(method: Method, pattern: PathPattern, access: Access) -> Self {
        Self {
            method: Some(method),
            pattern,
            access,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

const USER_OR_BUSINESS: &[Role] = &[Role::User, Role::Business];
const BUSINESS_ONLY: &[Role] = &[Role::Business];

/// Ordered rule table with a fallback access level
#[derive(Debug, Clone)]
pub struct Policy {
    rules: Vec<Rule>,
    fallback: Access,
}

impl Policy {
    pub fn new(rules: Vec<Rule>, fallback: Access) -> Self {
        Self { rules, fallback }
    }

    /// The platform's route table
    pub fn platform() -> Self {
        use Access::*;
        use PathPattern::*;

        Self::new(
            vec![
                Rule::any(Exact("/"), Public),
                Rule::any(Exact("/api/"), Public),
                Rule::any(Exact("/health"), Public),
                Rule::any(Subtree("/auth"), Public),
                Rule::on(Method::GET, Exact("/jobs"), Public),
                // job lookups are POSTed by the frontend
                Rule::on(Method::POST, Exact("/jobs"), Public),
                Rule::on(Method::POST, Exact("/applications"), Public),
                Rule::any(Subtree("/mentorship"), Public),
                Rule::any(Subtree("/project"), Public),
                Rule::any(Subtree("/scanner"), Public),
                Rule::any(Subtree("/business"), AnyRole(BUSINESS_ONLY)),
                Rule::on(Method::GET, Exact("/profile"), AnyRole(USER_OR_BUSINESS)),
                Rule::on(Method::PUT, Exact("/profile"), AnyRole(USER_OR_BUSINESS)),
            ],
            Authenticated,
        )
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Access required for a request
    pub fn evaluate(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.access)
            .unwrap_or(self.fallback)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::platform()
    }
}
