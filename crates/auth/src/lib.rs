//! `tenantgate-auth`: pure authentication/authorization core.
//!
//! No transport or storage code lives here. Every type holds only immutable
//! configuration and can be shared across concurrent calls.

pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod identity;
pub mod policy;
pub mod roles;

pub use claims::{Claims, ClaimsError, validate_claims};
pub use codec::{TokenCodec, TokenVerifier, parse_algorithm};
pub use config::{AccessConfig, AuthConfig, ConfigError, JwtConfig, Secret};
pub use error::{AuthError, DenialKind};
pub use evaluate::{Evaluator, Explanation, Scope};
pub use identity::Identity;
pub use policy::{AccessPolicy, Tier};
pub use roles::Role;
