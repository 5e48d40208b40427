use serde::Serialize;
use thiserror::Error;

/// Why a scope check denied an otherwise authenticated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    InsufficientRole,
    NotSelf,
    TenantMismatch,
    NotTenantAdmin,
    PrivilegeEscalation,
    /// An empty `AnyOf` scope; nothing can satisfy it.
    Unsatisfiable,
}

impl core::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            DenialKind::InsufficientRole => "insufficient role",
            DenialKind::NotSelf => "not the target user",
            DenialKind::TenantMismatch => "tenant mismatch",
            DenialKind::NotTenantAdmin => "not a tenant admin of the target tenant",
            DenialKind::PrivilegeEscalation => "privilege escalation",
            DenialKind::Unsatisfiable => "no scope can be satisfied",
        };
        f.write_str(s)
    }
}

/// Outcome of gating a call, as seen by collaborators.
///
/// `Unauthenticated` carries no detail; the specific verification
/// failure is only logged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("permission denied: {0}")]
    PermissionDenied(DenialKind),

    #[error("internal error")]
    Internal(String),
}

impl AuthError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
