use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Query},
    response::Response,
    routing::get,
    Extension, Form, Router,
};
use hyper::HeaderMap;
use serde::Deserialize;

pub use flow::{LoginFlow, LoginForm};
pub use page::LoginPage;

mod flow;
mod page;

#[derive(Deserialize)]
struct RedirectQuery {
    redirect: Option<String>,
}

async fn display(
    Extension(flow): Extension<Arc<LoginFlow>>,
    Query(query): Query<RedirectQuery>,
    headers: HeaderMap,
) -> Response {
    flow.display(&headers, query.redirect.as_deref())
}

async fn submit(
    Extension(flow): Extension<Arc<LoginFlow>>,
    Query(query): Query<RedirectQuery>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    flow.submit(form, query.redirect.as_deref()).await
}

async fn logout(Extension(flow): Extension<Arc<LoginFlow>>) -> Response {
    flow.logout()
}

pub fn router(flow: Arc<LoginFlow>) -> Router {
    Router::new()
        .route("/login", get(display).post(submit))
        .route("/logout", get(logout).post(logout))
        .route_layer(Extension(flow))
}
