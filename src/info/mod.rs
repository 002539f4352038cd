use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthMode;
use crate::directory::Directory;
use crate::response::negotiator;

mod health;
mod service;

pub struct ServiceInfo {
    pub directory: Arc<dyn Directory>,
    pub mode: AuthMode,
    pub session_lifetime: Duration,
}

pub fn router(info: Arc<ServiceInfo>) -> Router {
    Router::new()
        .route("/", get(service::handler))
        .route("/health", get(health::handler))
        .route_layer(Extension(info))
        .route_layer(Extension(negotiator()))
}
