//! Reference user service.
//!
//! Each handler authorizes through [`crate::authz`] before touching the
//! directory. Mutations authorize inside the directory's write lock.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};

use tenantgate_core::UserId;

use crate::app::dto::{
    AddUserRequest, AddUserResponse, Empty, UpdateUserRequest, UpdateUserRestrictedRequest,
    UserListResponse, UserPrivateResponse, UserPublicResponse, UserRequest,
};
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, NewUser};
use crate::authz::{self, authorize_call};
use crate::context::CallContext;

pub async fn add_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<AddUserResponse>), ApiError> {
    let record = services
        .users
        .insert(NewUser {
            username: body.username,
            full_name: body.full_name,
            first_name: body.first_name,
            last_name: body.last_name,
            member: body.member,
            newsletter_notification: body.newsletter_notification,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AddUserResponse { id: record.id })))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<UserRequest>,
) -> Result<Json<UserPublicResponse>, ApiError> {
    let record = services.users.get(body.user_id()?).await?;
    Ok(Json(UserPublicResponse::from(&record)))
}

pub async fn get_user_restricted(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Json(body): Json<UserRequest>,
) -> Result<Json<UserPrivateResponse>, ApiError> {
    let record = services
        .users
        .get(body.user_id()?)
        .await
        .map_err(|err| authz::conceal_missing(&ctx, &services.evaluator, err.into()))?;
    authorize_call(&ctx, &services.evaluator, &authz::read_private(&record))?;
    Ok(Json(UserPrivateResponse::from(&record)))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Empty>, ApiError> {
    let id = body.id.parse::<UserId>()?;
    services
        .users
        .update(id, |current| -> Result<_, ApiError> {
            authorize_call(&ctx, &services.evaluator, &authz::update_profile(current))?;

            let mut next = current.clone();
            if let Some(username) = body.username {
                next.username = username;
            }
            if let Some(full_name) = body.full_name {
                next.full_name = full_name;
            }
            if body.first_name.is_some() {
                next.first_name = body.first_name;
            }
            if body.last_name.is_some() {
                next.last_name = body.last_name;
            }
            if let Some(flag) = body.newsletter_notification {
                next.newsletter_notification = flag;
            }
            Ok(next)
        })
        .await
        .map_err(|err| authz::conceal_missing(&ctx, &services.evaluator, err))?;

    Ok(Json(Empty {}))
}

pub async fn update_user_restricted(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Json(body): Json<UpdateUserRestrictedRequest>,
) -> Result<Json<Empty>, ApiError> {
    let id = body.id.parse::<UserId>()?;
    let new_role = body.role()?;
    let new_tenant = body.tenant()?;

    services
        .users
        .update(id, |current| -> Result<_, ApiError> {
            let scope = authz::update_restricted(current, new_role, new_tenant);
            let caller = authorize_call(&ctx, &services.evaluator, &scope)?;

            let mut next = current.clone();
            if let Some(username) = body.username {
                next.username = username;
            }
            if let Some(full_name) = body.full_name {
                next.full_name = full_name;
            }
            if body.first_name.is_some() {
                next.first_name = body.first_name;
            }
            if body.last_name.is_some() {
                next.last_name = body.last_name;
            }
            if let Some(member) = body.member {
                next.member = member;
            }
            if let Some(flag) = body.newsletter_notification {
                next.newsletter_notification = flag;
            }
            if let Some(role) = new_role {
                next.role = role;
            }
            if let Some(tenant) = new_tenant {
                next.tenant_id = tenant;
            }

            if next.role != current.role || next.tenant_id != current.tenant_id {
                tracing::info!(
                    caller_id = %caller.id,
                    user_id = %current.id,
                    role = %next.role,
                    tenant_id = %next.tenant_id,
                    "privileges changed"
                );
            }
            Ok(next)
        })
        .await
        .map_err(|err| authz::conceal_missing(&ctx, &services.evaluator, err))?;

    Ok(Json(Empty {}))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Json(body): Json<UserRequest>,
) -> Result<Json<Empty>, ApiError> {
    services
        .users
        .remove(body.user_id()?, |current| -> Result<_, ApiError> {
            authorize_call(&ctx, &services.evaluator, &authz::delete_user(current))?;
            Ok(())
        })
        .await
        .map_err(|err| authz::conceal_missing(&ctx, &services.evaluator, err))?;

    Ok(Json(Empty {}))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
) -> Result<Json<UserListResponse>, ApiError> {
    authorize_call(&ctx, &services.evaluator, &authz::list_users())?;

    let users = services.users.list().await.iter().map(UserPrivateResponse::from).collect();
    Ok(Json(UserListResponse { users }))
}
