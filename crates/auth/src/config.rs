//! Startup configuration for the auth core.
//!
//! Loaded once (YAML file + environment overrides), validated when the codec
//! and policy are built, then shared read-only.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

pub const DEFAULT_DURATION_MINUTES: u32 = 15;
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Startup-time configuration failure. Never produced while serving calls.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("no signing key configured")]
    MissingKey,

    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid token duration: {0}")]
    InvalidDuration(String),

    #[error("method '{0}' is configured as both no-token and public-user")]
    OverlappingMethod(String),

    #[error("global override must be admin or super_admin, got '{0}'")]
    InvalidOverride(String),
}

/// Signing secret. `Debug` never prints the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: Secret,

    /// Token validity in minutes.
    #[serde(default = "default_duration")]
    pub duration: u32,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(secret),
            duration: DEFAULT_DURATION_MINUTES,
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Methods callable without any credential.
    #[serde(default)]
    pub no_token_methods: Vec<String>,

    /// Methods that need a valid credential but no further role check.
    #[serde(default)]
    pub public_user_methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,

    #[serde(default)]
    pub access: AccessConfig,

    /// Least privileged role that bypasses tenant scoping.
    #[serde(default = "default_override")]
    pub global_override: Role,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.to_string()
}

fn default_override() -> Role {
    Role::Admin
}

impl AuthConfig {
    pub fn new(jwt: JwtConfig, access: AccessConfig) -> Self {
        Self {
            jwt,
            access,
            global_override: default_override(),
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.check_override()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `TENANTGATE_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("TENANTGATE_JWT_SECRET") {
            self.jwt.secret = Secret::new(secret);
        }
        if let Some(raw) = lookup("TENANTGATE_JWT_DURATION") {
            self.jwt.duration = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidDuration(raw.clone()))?;
        }
        if let Some(algorithm) = lookup("TENANTGATE_JWT_ALGORITHM") {
            self.jwt.algorithm = algorithm.trim().to_string();
        }
        if let Some(raw) = lookup("TENANTGATE_GLOBAL_OVERRIDE") {
            self.global_override = raw
                .parse()
                .map_err(|_| ConfigError::InvalidOverride(raw.clone()))?;
        }
        self.check_override()?;
        Ok(self)
    }

    fn check_override(&self) -> Result<(), ConfigError> {
        if self.global_override.at_least(Role::Admin) {
            Ok(())
        } else {
            Err(ConfigError::InvalidOverride(self.global_override.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
jwt:
  secret: "s3cret"
  duration: 30
  algorithm: HS512
access:
  no_token_methods:
    - /user.ResonateUser/AddUser
  public_user_methods:
    - /user.ResonateUser/GetUser
global_override: super_admin
"#;

    #[test]
    fn loads_yaml_layout() {
        let config = AuthConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.jwt.secret, Secret::new("s3cret"));
        assert_eq!(config.jwt.duration, 30);
        assert_eq!(config.jwt.algorithm, "HS512");
        assert_eq!(config.access.no_token_methods, vec!["/user.ResonateUser/AddUser"]);
        assert_eq!(config.global_override, Role::SuperAdmin);
    }

    #[test]
    fn defaults_apply() {
        let config = AuthConfig::from_yaml_str("jwt:\n  secret: x\n").unwrap();
        assert_eq!(config.jwt.duration, DEFAULT_DURATION_MINUTES);
        assert_eq!(config.jwt.algorithm, DEFAULT_ALGORITHM);
        assert_eq!(config.global_override, Role::Admin);
        assert!(config.access.public_user_methods.is_empty());
    }

    #[test]
    fn tenant_admin_cannot_be_global_override() {
        let err = AuthConfig::from_yaml_str("jwt:\n  secret: x\nglobal_override: tenant_admin\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride(_)));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TENANTGATE_JWT_SECRET", "from-env"),
            ("TENANTGATE_JWT_DURATION", "5"),
            ("TENANTGATE_JWT_ALGORITHM", "HS384"),
        ]);
        let config = AuthConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.jwt.secret, Secret::new("from-env"));
        assert_eq!(config.jwt.duration, 5);
        assert_eq!(config.jwt.algorithm, "HS384");
    }

    #[test]
    fn bad_duration_override_is_rejected() {
        let err = AuthConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .with_overrides(|k| (k == "TENANTGATE_JWT_DURATION").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(_)));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let config = AuthConfig::from_yaml_str(SAMPLE).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("Secret(***)"));
    }
}
