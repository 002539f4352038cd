use std::fmt;

use axum::headers::{authorization::Basic, Authorization, HeaderMapExt};
use hyper::HeaderMap;

use crate::error::{auth as AuthError, Error};

pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: &str, password: &str) -> Result<Self, Error> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MalformedRequest);
        }

        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    /// `Ok(None)` when no Authorization header is present, `MalformedRequest` when it can't be decoded.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, Error> {
        match headers.typed_try_get::<Authorization<Basic>>() {
            Ok(Some(Authorization(basic))) => Self::new(basic.username(), basic.password()).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(AuthError::MalformedRequest),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
