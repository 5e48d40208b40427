use axum::{routing::post, Router};

pub mod iam;
pub mod system;
pub mod users;

/// Fully qualified method names served by this API.
///
/// The HTTP path of each route is its method name.
pub mod methods {
    pub const WHO_AM_I: &str = "/iam.ResonateIAM/WhoAmI";
    pub const REFRESH: &str = "/iam.ResonateIAM/Refresh";
    pub const LIST_ROLES: &str = "/iam.ResonateIAM/ListRoles";

    pub const ADD_USER: &str = "/user.ResonateUser/AddUser";
    pub const GET_USER: &str = "/user.ResonateUser/GetUser";
    pub const GET_USER_RESTRICTED: &str = "/user.ResonateUser/GetUserRestricted";
    pub const UPDATE_USER: &str = "/user.ResonateUser/UpdateUser";
    pub const UPDATE_USER_RESTRICTED: &str = "/user.ResonateUser/UpdateUserRestricted";
    pub const DELETE_USER: &str = "/user.ResonateUser/DeleteUser";
    pub const LIST_USERS: &str = "/user.ResonateUser/ListUsers";
}

/// Router for every intercepted RPC endpoint.
pub fn router() -> Router {
    Router::new()
        .route(methods::WHO_AM_I, post(iam::whoami))
        .route(methods::REFRESH, post(iam::refresh))
        .route(methods::LIST_ROLES, post(iam::list_roles))
        .route(methods::ADD_USER, post(users::add_user))
        .route(methods::GET_USER, post(users::get_user))
        .route(methods::GET_USER_RESTRICTED, post(users::get_user_restricted))
        .route(methods::UPDATE_USER, post(users::update_user))
        .route(methods::UPDATE_USER_RESTRICTED, post(users::update_user_restricted))
        .route(methods::DELETE_USER, post(users::delete_user))
        .route(methods::LIST_USERS, post(users::list_users))
}
