use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::Utc;
use serde_json::json;

use tenantgate_auth::Role;

use crate::app::dto::{TokenResponse, WhoAmIResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallContext;

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    let identity = ctx.require_identity()?;
    let global_override = services.evaluator.has_global_override(identity);
    Ok(Json(WhoAmIResponse::new(identity, global_override)))
}

/// Re-issue a token for the verified caller with a fresh expiry.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = ctx.require_identity()?;
    let now = Utc::now();
    let token = services.codec.issue_at(identity, now)?;
    tracing::info!(user_id = %identity.id, "token refreshed");

    Ok(Json(TokenResponse {
        token,
        expires_at: now + services.codec.duration(),
    }))
}

pub async fn list_roles() -> Json<serde_json::Value> {
    let roles = Role::ALL
        .into_iter()
        .map(|role| {
            json!({
                "id": i64::from(role),
                "name": role.name(),
                "description": role.description(),
            })
        })
        .collect::<Vec<_>>();
    Json(json!({ "roles": roles }))
}
