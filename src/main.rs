use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::ConnectInfo,
    middleware::{self, Next},
    response::IntoResponse,
    Router, Server,
};
use clap::Parser;
use hyper::Request;

use crate::{
    auth::{AuthDecisionStrategy, AuthMode, BasicAuth, CookieSession, ErrorDetails},
    directory::{Directory, LdapDirectory},
    info::ServiceInfo,
    login::{LoginFlow, LoginPage},
    options::Options,
    session::SessionCookie,
};

mod auth;
mod directory;
mod error;
mod info;
mod login;
mod misc;
mod options;
mod response;
mod session;

async fn log_request<B>(req: Request<B>, next: Next<B>) -> impl IntoResponse {
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => log::info!("{} {} {}", addr, req.method(), req.uri().path()),
        None => log::info!("{} {}", req.method(), req.uri().path()),
    }
    next.run(req).await
}

fn app(options: &Options) -> Router {
    let directory: Arc<dyn Directory> = Arc::new(LdapDirectory::new(options.ldap_settings()));
    let details = ErrorDetails {
        exposed: options.expose_error_details,
    };

    let (strategy, login): (Arc<dyn AuthDecisionStrategy>, Option<Router>) = match options.auth_mode {
        AuthMode::Cookie => {
            let tokens = Arc::new(
                options
                    .session_tokens()
                    .unwrap_or_else(|e| exit_error!("Invalid session configuration: {}", e)),
            );
            let cookie = SessionCookie::new(options.cookie_name.clone());
            let flow = LoginFlow::new(
                Arc::clone(&directory),
                Arc::clone(&tokens),
                cookie.clone(),
                LoginPage::new(&options.theme, options.session_lifetime),
                options.default_redirect.clone(),
            );
            (
                Arc::new(CookieSession::new(tokens, cookie)),
                Some(login::router(Arc::new(flow))),
            )
        }
        AuthMode::Basic => (
            Arc::new(BasicAuth::new(Arc::clone(&directory), options.realm.clone())),
            None,
        ),
    };

    let info = Arc::new(ServiceInfo {
        directory: Arc::clone(&directory),
        mode: strategy.mode(),
        session_lifetime: options.session_lifetime,
    });

    let mut app = Router::new()
        .merge(auth::router(strategy, directory, details))
        .merge(info::router(info));
    if let Some(login) = login {
        app = app.merge(login);
    }
    app.layer(middleware::from_fn(log_request))
}

#[tokio::main]
async fn main() {
    let options = Options::parse();
    env_logger::Builder::new()
        .filter_level(options.log_level())
        .init();

    if options.expose_error_details {
        log::warn!("Directory failure details are returned to /auth and /validate callers");
    }
    let app = app(&options);

    let address = SocketAddr::new(options.address, options.port);
    log::info!(
        "App is running on: {} (mode: {}, directory: {}, users: {})",
        address,
        options.auth_mode.as_str(),
        options.ldap_server,
        options.user_base()
    );
    Server::bind(&address)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .unwrap_or_else(|e| exit_error!("Server stopped: {}", e))
}
