use std::sync::Arc;

use axum::Extension;
use hyper::StatusCode;
use serde::Serialize;

use super::ServiceInfo;
use crate::misc::format_lifetime;
use crate::response::{negotiated, ApiHeader, ApiResponse, Negotiated, SingleLine};

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(super) enum Health {
    Healthy {
        directory: &'static str,
        session_lifetime: String,
    },
    Unhealthy {
        error: String,
    },
}

impl ApiHeader for Health {
    fn status_code(&self) -> StatusCode {
        match self {
            Health::Healthy { .. } => StatusCode::OK,
            Health::Unhealthy { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn success(&self) -> bool {
        matches!(self, Health::Healthy { .. })
    }
}

impl SingleLine for Health {
    fn single_lined(&self) -> String {
        match self {
            Health::Healthy { .. } => "healthy".to_owned(),
            Health::Unhealthy { error } => format!("unhealthy: {}", error),
        }
    }
}

pub(super) async fn handler(
    Extension(info): Extension<Arc<ServiceInfo>>,
    negotiation: Option<Negotiated>,
) -> ApiResponse<Health> {
    let response_type = negotiated(negotiation);
    let health = match info.directory.check_reachability().await {
        Ok(()) => Health::Healthy {
            directory: "connected",
            session_lifetime: format_lifetime(info.session_lifetime),
        },
        Err(err) => {
            log::error!("Health check failed: {}", err);
            Health::Unhealthy { error: err.to_string() }
        }
    };
    response_type.to_api_response(health)
}
