use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenantgate_auth::{Identity, Role};
use tenantgate_core::{DomainResult, TenantId, UserId};

use crate::app::services::UserRecord;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub member: bool,
    #[serde(default)]
    pub newsletter_notification: bool,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub id: String,
}

impl UserRequest {
    pub fn user_id(&self) -> DomainResult<UserId> {
        self.id.parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub newsletter_notification: Option<bool>,
}

/// Privileged update. `role_id` and `tenant_id` are decoded generically and
/// range-checked before use.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRestrictedRequest {
    pub id: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub member: Option<bool>,
    pub newsletter_notification: Option<bool>,
    pub role_id: Option<i64>,
    pub tenant_id: Option<i64>,
}

impl UpdateUserRestrictedRequest {
    pub fn role(&self) -> DomainResult<Option<Role>> {
        self.role_id.map(Role::from_ordinal).transpose()
    }

    pub fn tenant(&self) -> DomainResult<Option<TenantId>> {
        self.tenant_id.map(TenantId::try_from).transpose()
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AddUserResponse {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct UserPublicResponse {
    pub username: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub member: bool,
}

impl From<&UserRecord> for UserPublicResponse {
    fn from(u: &UserRecord) -> Self {
        Self {
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            member: u.member,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPrivateResponse {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub member: bool,
    pub newsletter_notification: bool,
    pub role_id: i64,
    pub role: Role,
    pub tenant_id: TenantId,
}

impl From<&UserRecord> for UserPrivateResponse {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            member: u.member,
            newsletter_notification: u.newsletter_notification,
            role_id: u.role.into(),
            role: u.role,
            tenant_id: u.tenant_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserPrivateResponse>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub role_id: i64,
    pub global_override: bool,
}

impl WhoAmIResponse {
    pub fn new(identity: &Identity, global_override: bool) -> Self {
        Self {
            id: identity.id,
            tenant_id: identity.tenant_id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role,
            role_id: identity.role.into(),
            global_override,
        }
    }
}
