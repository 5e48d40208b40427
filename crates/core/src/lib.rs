//! `tenantgate-core`: shared identifiers and value errors.
//!
//! This crate contains **pure** primitives (no transport, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{TenantId, UserId};
