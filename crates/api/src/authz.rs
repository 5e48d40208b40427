//! API-side authorization guard for restricted operations.
//!
//! Each restricted user-service method states its own scope here. Role and
//! tenant values taken from a request body only ever appear as the *target*
//! of a scope; the caller's privileges always come from the verified identity.

use tenantgate_auth::{AuthError, Evaluator, Identity, Role, Scope};
use tenantgate_core::{DomainError, TenantId};

use crate::app::errors::ApiError;
use crate::app::services::UserRecord;
use crate::context::CallContext;

/// Check `scope` for the current call.
///
/// This is intended to be called **before** any side effect in the handler.
pub fn authorize_call<'a>(
    ctx: &'a CallContext,
    evaluator: &Evaluator,
    scope: &Scope,
) -> Result<&'a Identity, AuthError> {
    let identity = ctx.require_identity()?;
    evaluator.authorize(identity, scope)?;
    Ok(identity)
}

/// Report an unknown target id as `NotFound` only to callers who may list
/// users; everyone else gets the denial they would get for any user they
/// cannot manage.
pub fn conceal_missing(ctx: &CallContext, evaluator: &Evaluator, err: ApiError) -> ApiError {
    match err {
        ApiError::Domain(DomainError::NotFound) => {
            match authorize_call(ctx, evaluator, &list_users()) {
                Ok(_) => ApiError::Domain(DomainError::NotFound),
                Err(denied) => ApiError::Auth(denied),
            }
        }
        other => other,
    }
}

/// Manage another user: tenant admin of their tenant, and not less
/// privileged than they are.
pub fn manage_user(target: &UserRecord) -> Scope {
    Scope::AllOf(vec![
        Scope::TenantAdmin(target.tenant_id),
        Scope::NoEscalation(target.role),
    ])
}

/// Read private profile data: the user themself, or someone who manages them.
pub fn read_private(target: &UserRecord) -> Scope {
    Scope::AnyOf(vec![Scope::User(target.id), manage_user(target)])
}

/// Update non-privileged profile fields: self only.
pub fn update_profile(target: &UserRecord) -> Scope {
    Scope::User(target.id)
}

/// Update privileged fields (role, tenant).
///
/// Granting a role needs at least that role; granting `Admin` or above is
/// reserved for `SuperAdmin`. Moving a user needs tenant admin of the
/// destination tenant as well.
pub fn update_restricted(
    target: &UserRecord,
    new_role: Option<Role>,
    new_tenant: Option<TenantId>,
) -> Scope {
    let mut required = vec![manage_user(target)];
    if let Some(role) = new_role {
        required.push(Scope::NoEscalation(role));
        if role.at_least(Role::Admin) {
            required.push(Scope::Role(Role::SuperAdmin));
        }
    }
    if let Some(tenant) = new_tenant {
        required.push(Scope::TenantAdmin(tenant));
    }
    Scope::AllOf(required)
}

pub fn delete_user(target: &UserRecord) -> Scope {
    Scope::AnyOf(vec![Scope::User(target.id), manage_user(target)])
}

pub fn list_users() -> Scope {
    Scope::Role(Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantgate_auth::DenialKind;
    use tenantgate_core::UserId;

    fn record(role: Role, tenant: i32) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            tenant_id: TenantId::new(tenant),
            username: "target@example.com".to_string(),
            full_name: "Target".to_string(),
            first_name: None,
            last_name: None,
            member: false,
            newsletter_notification: false,
            role,
        }
    }

    fn caller(role: Role, tenant: i32) -> Identity {
        Identity::new(UserId::new(), TenantId::new(tenant), "caller@example.com", role)
    }

    #[test]
    fn tenant_admin_cannot_promote_to_super_admin() {
        let eval = Evaluator::default();
        let target = record(Role::User, 7);
        let scope = update_restricted(&target, Some(Role::SuperAdmin), None);
        assert_eq!(
            eval.check(&caller(Role::TenantAdmin, 7), &scope),
            Err(DenialKind::PrivilegeEscalation)
        );
    }

    #[test]
    fn admin_cannot_assign_admin_but_super_admin_can() {
        let eval = Evaluator::default();
        let target = record(Role::User, 7);
        let scope = update_restricted(&target, Some(Role::Admin), None);
        assert_eq!(
            eval.check(&caller(Role::Admin, 1), &scope),
            Err(DenialKind::InsufficientRole)
        );
        assert!(eval.check(&caller(Role::SuperAdmin, 1), &scope).is_ok());
    }

    #[test]
    fn tenant_admin_cannot_move_user_to_foreign_tenant() {
        let eval = Evaluator::default();
        let target = record(Role::Artist, 7);
        let scope = update_restricted(&target, None, Some(TenantId::new(8)));
        assert_eq!(
            eval.check(&caller(Role::TenantAdmin, 7), &scope),
            Err(DenialKind::NotTenantAdmin)
        );
        let scope = update_restricted(&target, Some(Role::Artist), Some(TenantId::new(7)));
        assert!(eval.check(&caller(Role::TenantAdmin, 7), &scope).is_ok());
    }

    #[test]
    fn tenant_admin_cannot_manage_an_admin_in_their_tenant() {
        let eval = Evaluator::default();
        let target = record(Role::Admin, 7);
        assert_eq!(
            eval.check(&caller(Role::TenantAdmin, 7), &manage_user(&target)),
            Err(DenialKind::PrivilegeEscalation)
        );
    }

    #[test]
    fn unknown_target_is_only_revealed_to_admins() {
        let eval = Evaluator::default();
        let missing = || ApiError::Domain(DomainError::NotFound);
        let ctx = |role| {
            CallContext::authenticated(
                "/user.ResonateUser/GetUserRestricted",
                tenantgate_auth::Tier::Restricted,
                caller(role, 7),
            )
        };

        assert_eq!(
            conceal_missing(&ctx(Role::TenantAdmin), &eval, missing()),
            ApiError::Auth(AuthError::PermissionDenied(DenialKind::InsufficientRole))
        );
        assert_eq!(conceal_missing(&ctx(Role::Admin), &eval, missing()), missing());

        let conflict = || ApiError::Domain(DomainError::conflict("taken"));
        assert_eq!(conceal_missing(&ctx(Role::User), &eval, conflict()), conflict());
    }

    #[test]
    fn anonymous_call_is_unauthenticated() {
        let ctx = CallContext::anonymous("/user.ResonateUser/DeleteUser");
        let target = record(Role::User, 1);
        assert_eq!(
            authorize_call(&ctx, &Evaluator::default(), &delete_user(&target)),
            Err(AuthError::Unauthenticated)
        );
    }
}
