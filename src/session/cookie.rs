use std::time::Duration;

use axum::headers::{Cookie, HeaderMapExt};
use hyper::{header::HeaderValue, HeaderMap};

const ATTRIBUTES: &str = "Path=/; HttpOnly; Secure; SameSite=Lax";

#[derive(Clone, Debug)]
pub struct SessionCookie {
    name: String,
}

impl SessionCookie {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .typed_get::<Cookie>()?
            .get(&self.name)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    }

    pub fn set(&self, token: &str, lifetime: Duration) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}={}; Max-Age={}; {}",
            self.name,
            token,
            lifetime.as_secs(),
            ATTRIBUTES
        ))
        .ok()
    }

    pub fn clear(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.name, ATTRIBUTES
        ))
        .ok()
    }
}
