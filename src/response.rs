use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http_negotiator::{AsNegotiationStr, ContentTypeNegotiation, Negotiation, Negotiator};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

pub trait ApiHeader {
    fn status_code(&self) -> StatusCode {
        StatusCode::OK
    }

    fn additional_headers(&self) -> HeaderMap {
        HeaderMap::default()
    }

    fn success(&self) -> bool {
        true
    }
}

pub trait SingleLine {
    fn single_lined(&self) -> String;
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ResponseType {
    Json,
    Text,
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Json
    }
}

impl AsNegotiationStr for ResponseType {
    fn as_str(&self) -> &str {
        match self {
            ResponseType::Json => "application/json",
            ResponseType::Text => "text/plain",
        }
    }
}

impl ResponseType {
    pub fn to_api_response<T>(self, content: T) -> ApiResponse<T> {
        ApiResponse(self, content)
    }
}

pub type ResponseNegotiator = Negotiator<ContentTypeNegotiation, ResponseType>;

pub type Negotiated = Negotiation<ContentTypeNegotiation, ResponseType>;

pub fn negotiator() -> Arc<ResponseNegotiator> {
    Arc::new(
        Negotiator::new([ResponseType::Json, ResponseType::Text])
            .unwrap_or_else(|_| crate::exit_error!("Invalid response media types")),
    )
}

// Clients without an Accept header, or accepting none of our types, get JSON.
pub fn negotiated(negotiation: Option<Negotiated>) -> ResponseType {
    negotiation.map(Negotiation::into_inner).unwrap_or_default()
}

pub struct ApiResponse<T>(pub ResponseType, pub T);

impl<T> IntoResponse for ApiResponse<T>
where
    T: ApiHeader + Serialize + SingleLine,
{
    fn into_response(self) -> Response {
        (
            self.1.status_code(),
            self.1.additional_headers(),
            match self.0 {
                ResponseType::Json => {
                    #[derive(Serialize)]
                    struct JsonResponse<T> {
                        success: bool,
                        #[serde(flatten)]
                        data: T,
                    }
                    Json(JsonResponse {
                        success: self.1.success(),
                        data: self.1,
                    })
                    .into_response()
                }
                ResponseType::Text => self.1.single_lined().into_response(),
            },
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{routing::get, Extension, Router};
    use hyper::{body, header, Body, Request};
    use tower::ServiceExt;

    use super::{negotiated, negotiator, Negotiated};

    async fn kind(negotiation: Option<Negotiated>) -> String {
        format!("{:?}", negotiated(negotiation))
    }

    async fn negotiate(accept: Option<&'static str>) -> String {
        let app = Router::new()
            .route("/", get(kind))
            .layer(Extension(negotiator()));
        let mut req = Request::get("/");
        if let Some(accept) = accept {
            req = req.header(header::ACCEPT, accept);
        }
        let resp = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        String::from_utf8(body::to_bytes(resp.into_body()).await.unwrap().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn defaults_to_json() {
        assert_eq!(negotiate(None).await, "Json");
        assert_eq!(negotiate(Some("application/json")).await, "Json");
        assert_eq!(negotiate(Some("image/png")).await, "Json");
    }

    #[tokio::test]
    async fn plain_text() {
        assert_eq!(negotiate(Some("text/plain")).await, "Text");
        assert_eq!(negotiate(Some("text/html, text/plain;q=0.9")).await, "Text");
    }

    #[tokio::test]
    async fn weighted() {
        assert_eq!(
            negotiate(Some("text/plain;q=0.1, application/json;q=0.9")).await,
            "Json"
        );
        assert_eq!(negotiate(Some("text/plain;q=0")).await, "Json");
        assert_eq!(
            negotiate(Some("application/json;q=0.2, text/plain;q=0.8")).await,
            "Text"
        );
    }
}
