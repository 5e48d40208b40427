//! HTTP API: interceptor, routing, and request/response mapping.

pub mod app;
pub mod authz;
pub mod context;
pub mod interceptor;
pub mod middleware;
