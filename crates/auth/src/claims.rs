use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tenantgate_core::{TenantId, UserId};

use crate::{Identity, Role};

/// Signed token payload.
///
/// Field names are the compact wire keys. Tenant and role are decoded as
/// plain integers and range-checked by [`validate_claims`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,

    #[serde(rename = "t")]
    pub tenant: i64,

    #[serde(rename = "u")]
    pub username: String,

    #[serde(rename = "r")]
    pub role: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    pub fn for_identity(identity: &Identity, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: identity.id,
            tenant: i64::from(identity.tenant_id.get()),
            username: identity.username.clone(),
            role: i64::from(identity.role),
            exp: expires_at.timestamp(),
            email: identity.email.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token has expired")]
    Expired,

    #[error("tenant claim {0} is out of range")]
    TenantOutOfRange(i64),

    #[error("role claim {0} is not a known role")]
    UnknownRole(i64),
}

/// Validate decoded claims against `now` and turn them into an [`Identity`].
///
/// Signature verification happens before this, in the codec.
pub fn validate_claims(claims: Claims, now: DateTime<Utc>) -> Result<Identity, ClaimsError> {
    if now.timestamp() >= claims.exp {
        return Err(ClaimsError::Expired);
    }

    let tenant_id =
        TenantId::try_from(claims.tenant).map_err(|_| ClaimsError::TenantOutOfRange(claims.tenant))?;
    let role = Role::from_ordinal(claims.role).map_err(|_| ClaimsError::UnknownRole(claims.role))?;

    Ok(Identity {
        id: claims.id,
        tenant_id,
        username: claims.username,
        email: claims.email,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn identity() -> Identity {
        Identity::new(UserId::new(), TenantId::new(7), "alice@example.com", Role::Artist)
    }

    #[test]
    fn valid_claims_produce_identity() {
        let now = Utc::now();
        let id = identity();
        let claims = Claims::for_identity(&id, now + Duration::minutes(5));
        assert_eq!(validate_claims(claims, now).unwrap(), id);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let claims = Claims::for_identity(&identity(), now);
        assert_eq!(validate_claims(claims, now), Err(ClaimsError::Expired));
    }

    #[test]
    fn out_of_range_tenant_and_role_are_rejected() {
        let now = Utc::now();
        let mut claims = Claims::for_identity(&identity(), now + Duration::minutes(5));
        claims.tenant = i64::from(i32::MAX) + 10;
        assert_eq!(
            validate_claims(claims.clone(), now),
            Err(ClaimsError::TenantOutOfRange(i64::from(i32::MAX) + 10))
        );

        claims.tenant = 7;
        claims.role = 9;
        assert_eq!(validate_claims(claims, now), Err(ClaimsError::UnknownRole(9)));
    }

    #[test]
    fn wire_keys_are_compact() {
        let now = Utc::now();
        let claims = Claims::for_identity(&identity().with_email("a@b.c"), now);
        let value = serde_json::to_value(&claims).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "t", "u", "r", "exp", "e"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn email_is_omitted_when_absent() {
        let claims = Claims::for_identity(&identity(), Utc::now());
        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("e").is_none());
    }
}
