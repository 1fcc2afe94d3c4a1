//! Persistence collaborator for principals.
//!
//! Users and businesses live in separate account spaces: the same email may be
//! registered once as a user and once as a business.

use crate::error::AuthError;
use crate::models::{NewPrincipal, Principal, Profile, Role};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage of principals and their password digests
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Principal>, AuthError>;

    async fn find_by_id(&self, role: Role, id: Uuid) -> Result<Option<Principal>, AuthError>;

    /// Create a principal; fails with [`AuthError::EmailExists`] if the email is taken
    async fn create(&self, new: NewPrincipal) -> Result<Principal, AuthError>;

    async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError>;
}

// ============================================
// In-memory store
// ============================================

/// Process-local store, used when no database is configured
#[derive(Default)]
pub struct MemoryStore {
    principals: RwLock<HashMap<(Role, String), Principal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Principal>, AuthError> {
        let principals = self.principals.read().await;
        Ok(principals.get(&(role, email.to_string())).cloned())
    }

    async fn find_by_id(&self, role: Role, id: Uuid) -> Result<Option<Principal>, AuthError> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .find(|p| p.role == role && p.id == id)
            .cloned())
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal, AuthError> {
        let mut principals = self.principals.write().await;
        let key = (new.role(), new.email.clone());
        if principals.contains_key(&key) {
            return Err(AuthError::EmailExists);
        }

        let principal = Principal {
            id: Uuid::new_v4(),
            role: new.role(),
            email: new.email,
            password_hash: new.password_hash,
            profile: new.profile,
            created_at: Utc::now(),
        };
        principals.insert(key, principal.clone());
        Ok(principal)
    }

    async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        let mut principals = self.principals.write().await;
        let principal = principals
            .values_mut()
            .find(|p| p.role == role && p.id == id)
            .ok_or(AuthError::NotFound)?;
        principal.password_hash = password_hash.to_string();
        Ok(())
    }
}

// ============================================
// PostgreSQL store
// ============================================

/// Principals stored in PostgreSQL, one table per role
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for Principal {
    fn from(row: UserRow) -> Self {
        Principal {
            id: row.id,
            email: row.email,
            role: Role::User,
            password_hash: row.password_hash,
            profile: Profile::User { name: row.name },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BusinessRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    company_name: String,
    company_email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BusinessRow> for Principal {
    fn from(row: BusinessRow) -> Self {
        Principal {
            id: row.id,
            email: row.email,
            role: Role::Business,
            password_hash: row.password_hash,
            profile: Profile::Business {
                name: row.name,
                company_name: row.company_name,
                company_email: row.company_email,
                address: row.address,
                city: row.city,
                state: row.state,
                country: row.country,
            },
            created_at: row.created_at,
        }
    }
}

fn table(role: Role) -> &'static str {
    match role {
        Role::User => "users",
        Role::Business => "businesses",
    }
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AuthError> {
        let db = PgPool::connect(database_url).await?;
        Ok(Self::new(db))
    }

    /// Create the principal tables if they do not exist
    pub async fn run_migrations(&self) -> Result<(), AuthError> {
        tracing::info!("Running principal store migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                name VARCHAR(100),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS businesses (
                id UUID PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                name VARCHAR(100) NOT NULL,
                company_name VARCHAR(200) NOT NULL,
                company_email VARCHAR(255),
                address TEXT,
                city VARCHAR(100),
                state VARCHAR(100),
                country VARCHAR(100),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        tracing::info!("Principal store migrations completed successfully");
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at";
const BUSINESS_COLUMNS: &str = "id, email, password_hash, name, company_name, company_email, address, city, state, country, created_at";

#[async_trait]
impl PrincipalStore for PgStore {
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Principal>, AuthError> {
        let principal = match role {
            Role::User => sqlx::query_as::<_, UserRow>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.db)
            .await?
            .map(Principal::from),
            Role::Business => sqlx::query_as::<_, BusinessRow>(&format!(
                "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(&self.db)
            .await?
            .map(Principal::from),
        };
        Ok(principal)
    }

    async fn find_by_id(&self, role: Role, id: Uuid) -> Result<Option<Principal>, AuthError> {
        let principal = match role {
            Role::User => sqlx::query_as::<_, UserRow>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(Principal::from),
            Role::Business => sqlx::query_as::<_, BusinessRow>(&format!(
                "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(Principal::from),
        };
        Ok(principal)
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal, AuthError> {
        let id = Uuid::new_v4();

        // unique violations surface as AuthError::EmailExists
        let principal: Principal = match new.profile {
            Profile::User { name } => sqlx::query_as::<_, UserRow>(&format!(
                "INSERT INTO users (id, email, password_hash, name) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
            ))
            .bind(id)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(name)
            .fetch_one(&self.db)
            .await?
            .into(),
            Profile::Business {
                name,
                company_name,
                company_email,
                address,
                city,
                state,
                country,
            } => sqlx::query_as::<_, BusinessRow>(&format!(
                r#"
                INSERT INTO businesses
                    (id, email, password_hash, name, company_name, company_email, address, city, state, country)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {BUSINESS_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(name)
            .bind(company_name)
            .bind(company_email)
            .bind(address)
            .bind(city)
            .bind(state)
            .bind(country)
            .fetch_one(&self.db)
            .await?
            .into(),
        };

        Ok(principal)
    }

    async fn update_password(&self, role: Role, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET password_hash = $1, updated_at = NOW() WHERE id = $2",
            table(role)
        ))
        .bind(password_hash)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(principal_id = %id, %role, "Password update matched no rows");
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
}
