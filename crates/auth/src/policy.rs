use std::collections::HashSet;

use serde::Serialize;

use crate::config::{AccessConfig, ConfigError};

/// Access tier of an RPC method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// No credential needed.
    Open,
    /// Valid credential needed, no further role check.
    PublicUser,
    /// Valid credential plus an operation-specific scope check in the handler.
    Restricted,
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Tier::Open => "open",
            Tier::PublicUser => "public_user",
            Tier::Restricted => "restricted",
        })
    }
}

/// Static classification of fully qualified method names into tiers.
///
/// Built once from configuration; read-only afterwards. Any method not listed
/// is `Restricted`.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    no_token: HashSet<String>,
    public_user: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, J, S, T>(no_token: I, public_user: J) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let no_token: HashSet<String> = no_token.into_iter().map(Into::into).collect();
        let public_user: HashSet<String> = public_user.into_iter().map(Into::into).collect();

        if let Some(method) = no_token.intersection(&public_user).min() {
            return Err(ConfigError::OverlappingMethod(method.clone()));
        }

        Ok(Self {
            no_token,
            public_user,
        })
    }

    pub fn from_config(config: &AccessConfig) -> Result<Self, ConfigError> {
        Self::new(&config.no_token_methods, &config.public_user_methods)
    }

    pub fn classify(&self, method: &str) -> Tier {
        if self.no_token.contains(method) {
            Tier::Open
        } else if self.public_user.contains(method) {
            Tier::PublicUser
        } else {
            Tier::Restricted
        }
    }

    /// Explicitly configured methods of a tier, sorted. Always empty for
    /// `Restricted`, which is the default rather than a list.
    pub fn methods(&self, tier: Tier) -> Vec<&str> {
        let set = match tier {
            Tier::Open => &self.no_token,
            Tier::PublicUser => &self.public_user,
            Tier::Restricted => return Vec::new(),
        };
        let mut methods: Vec<&str> = set.iter().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }
}
