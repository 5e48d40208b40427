//! Authorization evaluator: pure role/tenant/self predicates.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy check)
//!
//! Handlers of `Restricted` methods describe what they need as a [`Scope`]
//! and call [`Evaluator::authorize`]. Role and tenant values supplied by the
//! caller are checked against the caller's own [`Identity`] here, never
//! trusted directly.

use serde::Serialize;

use tenantgate_core::{TenantId, UserId};

use crate::{AuthError, DenialKind, Identity, Role};

/// Requirement an operation places on the calling identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// At least as privileged as the given role.
    Role(Role),
    /// The caller is the given user.
    User(UserId),
    /// The caller belongs to the given tenant.
    Tenant(TenantId),
    /// Tenant admin of the given tenant, or global override.
    TenantAdmin(TenantId),
    /// Tenant match and minimum role, or global override.
    TenantAndRole { min: Role, tenant: TenantId },
    /// The caller is not less privileged than the role being granted or
    /// acted upon.
    NoEscalation(Role),
    AnyOf(Vec<Scope>),
    AllOf(Vec<Scope>),
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fn list(f: &mut core::fmt::Formatter<'_>, name: &str, items: &[Scope]) -> core::fmt::Result {
            write!(f, "{name}[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            f.write_str("]")
        }

        match self {
            Scope::Role(role) => write!(f, "role>={role}"),
            Scope::User(id) => write!(f, "user={id}"),
            Scope::Tenant(tenant) => write!(f, "tenant={tenant}"),
            Scope::TenantAdmin(tenant) => write!(f, "tenant_admin({tenant})"),
            Scope::TenantAndRole { min, tenant } => write!(f, "tenant_and_role({tenant}, {min})"),
            Scope::NoEscalation(role) => write!(f, "no_escalation({role})"),
            Scope::AnyOf(items) => list(f, "any_of", items),
            Scope::AllOf(items) => list(f, "all_of", items),
        }
    }
}

/// Decision predicates, parameterised by the global override threshold.
///
/// `global_override` is the least privileged role allowed to bypass tenant
/// scoping in [`Evaluator::enforce_tenant_admin`] and
/// [`Evaluator::enforce_tenant_and_role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    global_override: Role,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Role::Admin)
    }
}

impl Evaluator {
    pub const fn new(global_override: Role) -> Self {
        Self { global_override }
    }

    pub const fn global_override(&self) -> Role {
        self.global_override
    }

    pub fn has_global_override(&self, identity: &Identity) -> bool {
        identity.role.at_least(self.global_override)
    }

    pub fn enforce_role(&self, identity: &Identity, min: Role) -> bool {
        identity.role.at_least(min)
    }

    pub fn enforce_user(&self, identity: &Identity, target: UserId) -> bool {
        identity.id == target
    }

    pub fn enforce_tenant(&self, identity: &Identity, tenant: TenantId) -> bool {
        identity.tenant_id == tenant
    }

    pub fn enforce_tenant_admin(&self, identity: &Identity, tenant: TenantId) -> bool {
        self.has_global_override(identity)
            || (identity.role == Role::TenantAdmin && identity.tenant_id == tenant)
    }

    pub fn enforce_tenant_and_role(&self, identity: &Identity, min: Role, tenant: TenantId) -> bool {
        self.has_global_override(identity)
            || (identity.tenant_id == tenant && self.enforce_role(identity, min))
    }

    /// `true` iff the caller is strictly less privileged than `other`.
    pub fn is_lower_role(&self, identity: &Identity, other: Role) -> bool {
        other.outranks(identity.role)
    }

    /// Evaluate a scope, returning the denial reason on failure.
    pub fn check(&self, identity: &Identity, scope: &Scope) -> Result<(), DenialKind> {
        let ok = |granted: bool, kind: DenialKind| if granted { Ok(()) } else { Err(kind) };

        match scope {
            Scope::Role(min) => ok(self.enforce_role(identity, *min), DenialKind::InsufficientRole),
            Scope::User(id) => ok(self.enforce_user(identity, *id), DenialKind::NotSelf),
            Scope::Tenant(t) => ok(self.enforce_tenant(identity, *t), DenialKind::TenantMismatch),
            Scope::TenantAdmin(t) => {
                ok(self.enforce_tenant_admin(identity, *t), DenialKind::NotTenantAdmin)
            }
            Scope::TenantAndRole { min, tenant } => {
                if self.enforce_tenant_and_role(identity, *min, *tenant) {
                    Ok(())
                } else if identity.tenant_id != *tenant {
                    Err(DenialKind::TenantMismatch)
                } else {
                    Err(DenialKind::InsufficientRole)
                }
            }
            Scope::NoEscalation(role) => {
                ok(!self.is_lower_role(identity, *role), DenialKind::PrivilegeEscalation)
            }
            Scope::AnyOf(items) => {
                let mut last = DenialKind::Unsatisfiable;
                for item in items {
                    match self.check(identity, item) {
                        Ok(()) => return Ok(()),
                        Err(kind) => last = kind,
                    }
                }
                Err(last)
            }
            Scope::AllOf(items) => items.iter().try_for_each(|item| self.check(identity, item)),
        }
    }

    /// Authorize `identity` for `scope`, mapping a denial to `PermissionDenied`.
    pub fn authorize(&self, identity: &Identity, scope: &Scope) -> Result<(), AuthError> {
        self.check(identity, scope).map_err(|kind| {
            let explained = self.explain(identity, scope);
            tracing::info!(
                user_id = %explained.identity.user_id,
                tenant_id = %explained.identity.tenant_id,
                role = %explained.identity.role,
                global_override = explained.identity.global_override,
                scope = %explained.scope,
                denial = %kind,
                reason = %explained.reason,
                "permission denied"
            );
            AuthError::PermissionDenied(kind)
        })
    }

    /// Explain why an authorization decision was (or would be) made.
    pub fn explain(&self, identity: &Identity, scope: &Scope) -> Explanation {
        let outcome = self.check(identity, scope);
        let override_applies = self.has_global_override(identity);

        let reason = match &outcome {
            Ok(()) if override_applies => format!(
                "{} holds global override (>= {}) for {scope}",
                identity.role, self.global_override
            ),
            Ok(()) => format!("{} in tenant {} satisfies {scope}", identity.role, identity.tenant_id),
            Err(kind) => format!(
                "{} in tenant {} does not satisfy {scope}: {kind}",
                identity.role, identity.tenant_id
            ),
        };

        Explanation {
            scope: scope.to_string(),
            granted: outcome.is_ok(),
            reason,
            identity: IdentityState {
                user_id: identity.id,
                tenant_id: identity.tenant_id,
                role: identity.role,
                global_override: override_applies,
            },
            denial: outcome.err(),
        }
    }
}

/// Auditable description of a single authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub scope: String,
    pub granted: bool,
    pub reason: String,
    pub identity: IdentityState,
    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityState {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub global_override: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ident(role: Role, tenant: i32) -> Identity {
        Identity::new(UserId::new(), TenantId::new(tenant), "someone@example.com", role)
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    #[test]
    fn user_cannot_act_as_tenant_admin() {
        let eval = Evaluator::default();
        let caller = ident(Role::User, 7);
        assert!(!eval.enforce_tenant_admin(&caller, TenantId::new(7)));
        assert_eq!(
            eval.authorize(&caller, &Scope::TenantAdmin(TenantId::new(7))),
            Err(AuthError::PermissionDenied(DenialKind::NotTenantAdmin))
        );
    }

    #[test]
    fn tenant_admin_is_scoped_to_own_tenant() {
        let eval = Evaluator::default();
        let caller = ident(Role::TenantAdmin, 7);
        assert!(eval.enforce_tenant_admin(&caller, TenantId::new(7)));
        assert!(!eval.enforce_tenant_admin(&caller, TenantId::new(8)));
        assert!(eval.authorize(&caller, &Scope::TenantAdmin(TenantId::new(7))).is_ok());
    }

    #[test]
    fn global_override_threshold_is_configurable() {
        let admin = ident(Role::Admin, 1);
        let super_admin = ident(Role::SuperAdmin, 1);
        let other_tenant = TenantId::new(99);

        let lenient = Evaluator::new(Role::Admin);
        assert!(lenient.enforce_tenant_admin(&admin, other_tenant));
        assert!(lenient.enforce_tenant_admin(&super_admin, other_tenant));

        let strict = Evaluator::new(Role::SuperAdmin);
        assert!(!strict.enforce_tenant_admin(&admin, other_tenant));
        assert!(strict.enforce_tenant_admin(&super_admin, other_tenant));
    }

    #[test]
    fn tenant_admin_cannot_grant_super_admin() {
        let eval = Evaluator::default();
        let caller = ident(Role::TenantAdmin, 7);
        assert!(eval.is_lower_role(&caller, Role::SuperAdmin));
        assert_eq!(
            eval.check(&caller, &Scope::NoEscalation(Role::SuperAdmin)),
            Err(DenialKind::PrivilegeEscalation)
        );
        assert!(eval.check(&caller, &Scope::NoEscalation(Role::Artist)).is_ok());
        assert!(eval.check(&caller, &Scope::NoEscalation(Role::TenantAdmin)).is_ok());
    }

    #[test]
    fn self_access_only_matches_own_id() {
        let eval = Evaluator::default();
        let caller = ident(Role::User, 7);
        assert!(eval.enforce_user(&caller, caller.id));
        assert!(!eval.enforce_user(&caller, UserId::new()));
    }

    #[test]
    fn tenant_and_role_reports_most_specific_denial() {
        let eval = Evaluator::default();
        let caller = ident(Role::Artist, 7);
        let scope = |tenant| Scope::TenantAndRole {
            min: Role::TenantAdmin,
            tenant: TenantId::new(tenant),
        };
        assert_eq!(eval.check(&caller, &scope(8)), Err(DenialKind::TenantMismatch));
        assert_eq!(eval.check(&caller, &scope(7)), Err(DenialKind::InsufficientRole));
    }

    #[test]
    fn combinators() {
        let eval = Evaluator::default();
        let caller = ident(Role::User, 7);
        let self_or_admin = Scope::AnyOf(vec![
            Scope::User(caller.id),
            Scope::TenantAdmin(TenantId::new(7)),
        ]);
        assert!(eval.check(&caller, &self_or_admin).is_ok());

        let someone_else = Scope::AnyOf(vec![
            Scope::User(UserId::new()),
            Scope::TenantAdmin(TenantId::new(7)),
        ]);
        assert_eq!(eval.check(&caller, &someone_else), Err(DenialKind::NotTenantAdmin));

        assert_eq!(eval.check(&caller, &Scope::AnyOf(vec![])), Err(DenialKind::Unsatisfiable));
        assert!(eval.check(&caller, &Scope::AllOf(vec![])).is_ok());

        let both = Scope::AllOf(vec![Scope::Tenant(TenantId::new(7)), Scope::Role(Role::Admin)]);
        assert_eq!(eval.check(&caller, &both), Err(DenialKind::InsufficientRole));
    }

    #[test]
    fn explanation_reports_override_and_denial() {
        let eval = Evaluator::default();
        let admin = ident(Role::Admin, 1);
        let explained = eval.explain(&admin, &Scope::TenantAdmin(TenantId::new(5)));
        assert!(explained.granted);
        assert!(explained.identity.global_override);
        assert!(explained.reason.contains("global override"));
        assert_eq!(explained.scope, "tenant_admin(5)");

        let user = ident(Role::User, 5);
        let explained = eval.explain(&user, &Scope::Role(Role::Artist));
        assert!(!explained.granted);
        assert_eq!(explained.denial, Some(DenialKind::InsufficientRole));
        let json = serde_json::to_value(&explained).unwrap();
        assert_eq!(json["denial"], "insufficient_role");
    }

    #[test]
    fn authorize_denial_agrees_with_explanation() {
        let eval = Evaluator::default();
        let caller = ident(Role::Artist, 4);
        let scopes = [
            Scope::Role(Role::Admin),
            Scope::User(UserId::new()),
            Scope::TenantAdmin(TenantId::new(4)),
            Scope::NoEscalation(Role::TenantAdmin),
            Scope::Tenant(TenantId::new(4)),
        ];
        for scope in scopes {
            let explained = eval.explain(&caller, &scope);
            match eval.authorize(&caller, &scope) {
                Ok(()) => assert!(explained.granted, "{scope}"),
                Err(AuthError::PermissionDenied(kind)) => {
                    assert_eq!(explained.denial, Some(kind), "{scope}");
                    assert!(explained.reason.contains(&kind.to_string()));
                }
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: enforce_role is true iff the caller's ordinal <= min's ordinal.
        #[test]
        fn enforce_role_is_monotone(role in any_role(), min in any_role(), tenant in any::<i32>()) {
            let eval = Evaluator::default();
            let caller = ident(role, tenant);
            prop_assert_eq!(eval.enforce_role(&caller, min), role.ordinal() <= min.ordinal());
            prop_assert!(eval.enforce_role(&ident(Role::SuperAdmin, tenant), min));
        }

        /// Property: enforce_role and is_lower_role are never both true.
        #[test]
        fn enforce_role_excludes_is_lower_role(role in any_role(), other in any_role()) {
            let eval = Evaluator::default();
            let caller = ident(role, 1);
            prop_assert!(!(eval.enforce_role(&caller, other) && eval.is_lower_role(&caller, other)));
            prop_assert!(eval.enforce_role(&caller, other) || eval.is_lower_role(&caller, other));
        }

        /// Property: tenant/role conjunction with the global override.
        #[test]
        fn tenant_and_role_conjunction(
            role in any_role(),
            min in any_role(),
            caller_tenant in 0i32..4,
            target_tenant in 0i32..4,
            strict in any::<bool>(),
        ) {
            let eval = Evaluator::new(if strict { Role::SuperAdmin } else { Role::Admin });
            let caller = ident(role, caller_tenant);
            let target = TenantId::new(target_tenant);
            let expected = (caller_tenant == target_tenant && eval.enforce_role(&caller, min))
                || eval.has_global_override(&caller);
            prop_assert_eq!(eval.enforce_tenant_and_role(&caller, min, target), expected);
        }

        /// Property: tenant admin holds iff exact tenant admin or global override.
        #[test]
        fn tenant_admin_definition(role in any_role(), caller_tenant in 0i32..4, target_tenant in 0i32..4) {
            let eval = Evaluator::default();
            let caller = ident(role, caller_tenant);
            let expected = (role == Role::TenantAdmin && caller_tenant == target_tenant)
                || role == Role::Admin
                || role == Role::SuperAdmin;
            prop_assert_eq!(eval.enforce_tenant_admin(&caller, TenantId::new(target_tenant)), expected);
        }
    }
}
