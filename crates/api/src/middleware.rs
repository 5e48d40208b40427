use std::sync::Arc;

use axum::{extract::State, middleware::Next, response::Response};

use crate::app::errors;
use crate::interceptor::AuthInterceptor;

#[derive(Clone)]
pub struct AuthState {
    pub interceptor: Arc<AuthInterceptor>,
}

/// Axum adapter for [`AuthInterceptor`].
///
/// The request path is the fully qualified method name
/// (e.g. `/user.ResonateUser/GetUser`). On success the [`CallContext`] is
/// stored in the request extensions for the handler.
///
/// [`CallContext`]: crate::context::CallContext
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.uri().path().to_string();

    match state.interceptor.intercept(req.headers(), &method) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(err) => errors::auth_error_to_response(err),
    }
}
