use tenantgate_auth::{AuthError, Identity, Tier};

/// Per-call context produced by the interceptor.
///
/// Immutable; lives exactly as long as the call. `identity` is `None` only for
/// `Open` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    method: String,
    tier: Tier,
    identity: Option<Identity>,
}

impl CallContext {
    pub fn anonymous(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            tier: Tier::Open,
            identity: None,
        }
    }

    pub fn authenticated(method: impl Into<String>, tier: Tier, identity: Identity) -> Self {
        Self {
            method: method.into(),
            tier,
            identity: Some(identity),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The bound identity, or `Unauthenticated` when the call is anonymous.
    pub fn require_identity(&self) -> Result<&Identity, AuthError> {
        self.identity.as_ref().ok_or(AuthError::Unauthenticated)
    }
}
