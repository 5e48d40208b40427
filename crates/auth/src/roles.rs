use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tenantgate_core::DomainError;

/// Access role of a principal.
///
/// Roles form a total order by privilege where a **lower ordinal means more
/// privilege**: `SuperAdmin(1)` is the most powerful, `User(5)` the least.
///
/// `Role` has no `PartialOrd`/`Ord` impl. Compare with [`Role::outranks`] and
/// [`Role::at_least`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// All permissions, including assigning admins.
    SuperAdmin = 1,
    /// Admin permissions across all tenants, except assigning other admins.
    Admin = 2,
    /// Admin permissions over the users of a single tenant.
    TenantAdmin = 3,
    /// A standard user that may also upload and hold several personas.
    Artist = 4,
    /// A standard user.
    User = 5,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::TenantAdmin,
        Role::Artist,
        Role::User,
    ];

    /// Wire ordinal (1 = most privileged).
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// `true` iff `self` is strictly more privileged than `other`.
    ///
    /// This is the only place ordinals are compared.
    pub const fn outranks(self, other: Role) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// `true` iff `self` is at least as privileged as `min`.
    pub const fn at_least(self, min: Role) -> bool {
        !min.outranks(self)
    }

    /// Decode a generically typed ordinal, rejecting anything outside `1..=5`.
    pub fn from_ordinal(value: i64) -> Result<Self, DomainError> {
        match value {
            1 => Ok(Role::SuperAdmin),
            2 => Ok(Role::Admin),
            3 => Ok(Role::TenantAdmin),
            4 => Ok(Role::Artist),
            5 => Ok(Role::User),
            other => Err(DomainError::validation(format!("unknown role ordinal {other}"))),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::TenantAdmin => "tenant_admin",
            Role::Artist => "artist",
            Role::User => "user",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Role::SuperAdmin => "All permissions; can assign admins",
            Role::Admin => "Admin permissions across all tenants, except assigning other admins",
            Role::TenantAdmin => "Admin permissions over the users of one tenant",
            Role::Artist => "Standard user with personas and upload rights",
            Role::User => "Standard user",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Role> for i64 {
    fn from(value: Role) -> Self {
        i64::from(value.ordinal())
    }
}

impl TryFrom<i64> for Role {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Role::from_ordinal(value)
    }
}

/// Accepts either the snake_case name or the ordinal.
impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Role::from_ordinal(ordinal);
        }
        Role::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}
