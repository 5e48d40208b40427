//! Transport-independent request interceptor.
//!
//! `Received → Classified → {Open: Forwarded}
//!  | {PublicUser/Restricted: CredentialChecked → Forwarded} | Rejected`
//!
//! Rejections happen before the next handler is invoked and are final.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use tenantgate_auth::{AccessPolicy, AuthError, TokenVerifier, Tier};

use crate::context::CallContext;

/// Metadata key carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// Read access to call metadata (HTTP headers, gRPC metadata, test maps).
pub trait CallMetadata {
    fn get_str(&self, key: &str) -> Option<&str>;
}

impl CallMetadata for HeaderMap {
    fn get_str(&self, key: &str) -> Option<&str> {
        HeaderMap::get(self, key).and_then(|v| v.to_str().ok())
    }
}

impl CallMetadata for HashMap<String, String> {
    fn get_str(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

/// Extract `<token>` from `Bearer <token>`; scheme match is case-insensitive.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Admits, authenticates, or rejects each inbound call.
#[derive(Clone)]
pub struct AuthInterceptor {
    policy: Arc<AccessPolicy>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthInterceptor {
    pub fn new(policy: Arc<AccessPolicy>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { policy, verifier }
    }

    pub fn intercept<M>(&self, metadata: &M, method: &str) -> Result<CallContext, AuthError>
    where
        M: CallMetadata + ?Sized,
    {
        self.intercept_at(metadata, method, Utc::now())
    }

    pub fn intercept_at<M>(
        &self,
        metadata: &M,
        method: &str,
        now: DateTime<Utc>,
    ) -> Result<CallContext, AuthError>
    where
        M: CallMetadata + ?Sized,
    {
        let tier = self.policy.classify(method);
        if tier == Tier::Open {
            tracing::debug!(method, %tier, "call admitted without credential");
            return Ok(CallContext::anonymous(method));
        }

        let Some(token) = metadata.get_str(AUTHORIZATION).and_then(bearer_token) else {
            tracing::info!(method, %tier, "call rejected: missing credential");
            return Err(AuthError::Unauthenticated);
        };

        let identity = self.verifier.verify_at(token, now).inspect_err(|_| {
            tracing::info!(method, %tier, "call rejected: invalid credential");
        })?;

        tracing::debug!(
            method,
            %tier,
            user_id = %identity.id,
            tenant_id = %identity.tenant_id,
            "call authenticated"
        );
        Ok(CallContext::authenticated(method, tier, identity))
    }

    /// Run `next` with the call context, or return the rejection without
    /// invoking it.
    pub fn call<M, F, R>(&self, metadata: &M, method: &str, next: F) -> Result<R, AuthError>
    where
        M: CallMetadata + ?Sized,
        F: FnOnce(CallContext) -> R,
    {
        self.intercept(metadata, method).map(next)
    }
}
