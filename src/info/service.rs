use std::sync::Arc;

use axum::Extension;
use itertools::Itertools;
use serde::Serialize;

use super::ServiceInfo;
use crate::auth::AuthMode;
use crate::misc::format_lifetime;
use crate::response::{negotiated, ApiHeader, ApiResponse, Negotiated, SingleLine};

#[derive(Serialize)]
pub(super) struct Endpoint {
    path: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
pub(super) struct Metadata {
    service: &'static str,
    version: &'static str,
    mode: AuthMode,
    endpoints: Vec<Endpoint>,
    directory: String,
    user_base: String,
    session_lifetime: String,
    session_lifetime_secs: u64,
}

impl ApiHeader for Metadata {}

impl SingleLine for Metadata {
    fn single_lined(&self) -> String {
        format!(
            "{} {} ({}): {}",
            self.service,
            self.version,
            self.mode.as_str(),
            self.endpoints.iter().map(|e| e.path).join(" ")
        )
    }
}

fn endpoints(mode: AuthMode) -> Vec<Endpoint> {
    let mut endpoints = vec![Endpoint {
        path: "/auth",
        description: match mode {
            AuthMode::Cookie => "reverse proxy auth_request check, session cookie",
            AuthMode::Basic => "reverse proxy auth_request check, basic authorization",
        },
    }];
    if mode == AuthMode::Cookie {
        endpoints.push(Endpoint {
            path: "/login",
            description: "web login page",
        });
        endpoints.push(Endpoint {
            path: "/logout",
            description: "logout and clear session",
        });
    }
    endpoints.push(Endpoint {
        path: "/validate",
        description: "direct credential validation",
    });
    endpoints.push(Endpoint {
        path: "/health",
        description: "directory reachability",
    });
    endpoints
}

pub(super) async fn handler(
    Extension(info): Extension<Arc<ServiceInfo>>,
    negotiation: Option<Negotiated>,
) -> ApiResponse<Metadata> {
    let response_type = negotiated(negotiation);
    response_type.to_api_response(Metadata {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mode: info.mode,
        endpoints: endpoints(info.mode),
        directory: info.directory.address().to_owned(),
        user_base: info.directory.user_base().to_owned(),
        session_lifetime: format_lifetime(info.session_lifetime),
        session_lifetime_secs: info.session_lifetime.as_secs(),
    })
}
