use serde::{Deserialize, Serialize};

use tenantgate_core::{TenantId, UserId};

use crate::Role;

/// Verified identity of the calling principal.
///
/// Built fresh per call from verified claims and dropped when the call ends.
/// Nothing in this crate persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn new(id: UserId, tenant_id: TenantId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            tenant_id,
            username: username.into(),
            email: None,
            role,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
