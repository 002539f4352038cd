use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use clap::ValueEnum;
use serde::Serialize;

use crate::directory::Directory;
use crate::response::negotiator;

pub use credential::Credential;
pub use strategy::{AuthDecision, AuthDecisionStrategy, BasicAuth, CookieSession};

mod credential;
mod decision;
mod strategy;
mod validate;

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Signed session cookie issued by /login.
    Cookie,
    /// Authorization header checked against the directory on every request.
    Basic,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Cookie => "cookie",
            AuthMode::Basic => "basic",
        }
    }
}

/// Whether /auth and /validate tell machine clients why the directory refused them.
#[derive(Copy, Clone, Debug, Default)]
pub struct ErrorDetails {
    pub exposed: bool,
}

pub fn router(
    strategy: Arc<dyn AuthDecisionStrategy>,
    directory: Arc<dyn Directory>,
    details: ErrorDetails,
) -> Router {
    Router::new()
        .route("/auth", get(decision::handler).post(decision::handler))
        .route("/validate", post(validate::handler))
        .route_layer(Extension(strategy))
        .route_layer(Extension(directory))
        .route_layer(Extension(details))
        .route_layer(Extension(negotiator()))
}
