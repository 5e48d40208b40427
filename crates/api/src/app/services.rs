//! Service wiring: token codec, evaluator and the in-memory user directory.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tokio::sync::RwLock;

use tenantgate_auth::{AuthConfig, ConfigError, Evaluator, Role, TokenCodec};
use tenantgate_core::{DomainError, DomainResult, TenantId, UserId};

/// Tenant assigned to self-registered users until an admin moves them.
pub const UNASSIGNED_TENANT: TenantId = TenantId::new(0);

/// Shared, immutable-after-startup services handed to every handler.
#[derive(Debug)]
pub struct AppServices {
    pub codec: Arc<TokenCodec>,
    pub evaluator: Evaluator,
    pub users: UserDirectory,
}

impl AppServices {
    pub fn new(codec: Arc<TokenCodec>, evaluator: Evaluator) -> Self {
        Self {
            codec,
            evaluator,
            users: UserDirectory::default(),
        }
    }
}

pub fn build_services(config: &AuthConfig) -> Result<AppServices, ConfigError> {
    let codec = Arc::new(TokenCodec::new(&config.jwt)?);
    Ok(AppServices::new(codec, Evaluator::new(config.global_override)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub username: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub member: bool,
    pub newsletter_notification: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub member: bool,
    pub newsletter_notification: bool,
}

/// Usernames are email addresses.
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid username pattern")
});

pub fn validate_username(username: &str) -> DomainResult<()> {
    if !USERNAME_RE.is_match(username) {
        return Err(DomainError::validation("username must be a valid email"));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("argument {field} is required")));
    }
    Ok(())
}

/// In-memory user store keyed by [`UserId`].
///
/// Mutations take a check closure that runs under the write lock, so an
/// authorization decision is made against the same record that gets changed.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl UserDirectory {
    pub async fn insert(&self, new: NewUser) -> DomainResult<UserRecord> {
        require("username", &new.username)?;
        require("full_name", &new.full_name)?;
        validate_username(&new.username)?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == new.username) {
            return Err(DomainError::conflict("username already taken"));
        }

        let record = UserRecord {
            id: UserId::new(),
            tenant_id: UNASSIGNED_TENANT,
            username: new.username,
            full_name: new.full_name,
            first_name: new.first_name,
            last_name: new.last_name,
            member: new.member,
            newsletter_notification: new.newsletter_notification,
            role: Role::User,
        };
        users.insert(record.id, record.clone());
        tracing::info!(user_id = %record.id, "user added");
        Ok(record)
    }

    pub async fn get(&self, id: UserId) -> DomainResult<UserRecord> {
        self.users.read().await.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    /// All users, ordered by username.
    pub async fn list(&self) -> Vec<UserRecord> {
        let mut users: Vec<_> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Replace a record with the result of `change`.
    ///
    /// `change` sees the current record and either returns the new one or
    /// rejects; nothing is written on rejection.
    pub async fn update<E, F>(&self, id: UserId, change: F) -> Result<UserRecord, E>
    where
        E: From<DomainError>,
        F: FnOnce(&UserRecord) -> Result<UserRecord, E>,
    {
        let mut users = self.users.write().await;
        let current = users.get(&id).ok_or(DomainError::NotFound)?;
        let updated = change(current)?;

        require("username", &updated.username)?;
        require("full_name", &updated.full_name)?;
        if updated.username != current.username {
            validate_username(&updated.username)?;
            if users.values().any(|u| u.id != id && u.username == updated.username) {
                return Err(DomainError::conflict("username already taken").into());
            }
        }
        if updated.id != id {
            return Err(DomainError::validation("user id is immutable").into());
        }

        users.insert(id, updated.clone());
        tracing::info!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// Remove a record once `check` accepts it.
    pub async fn remove<E, F>(&self, id: UserId, check: F) -> Result<UserRecord, E>
    where
        E: From<DomainError>,
        F: FnOnce(&UserRecord) -> Result<(), E>,
    {
        let mut users = self.users.write().await;
        let current = users.get(&id).ok_or(DomainError::NotFound)?;
        check(current)?;

        let removed = users.remove(&id).ok_or(DomainError::NotFound)?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(removed)
    }
}
