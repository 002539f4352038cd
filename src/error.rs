use hyper::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::response::{ApiHeader, SingleLine};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredential,
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),
    #[error("invalid authorization format")]
    MalformedRequest,
    #[error("username and password required")]
    ValidationRequired,
    #[error("session expired")]
    TokenExpired,
    #[error("invalid session")]
    TokenInvalid,
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("cannot create session token")]
    TokenCreation,
    #[error("identity cannot be forwarded in headers")]
    IdentityHeader,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        use Error::*;
        match self {
            NotFound => StatusCode::UNAUTHORIZED,
            InvalidCredential => StatusCode::UNAUTHORIZED,
            DirectoryUnavailable(_) => StatusCode::UNAUTHORIZED,
            MalformedRequest => StatusCode::UNAUTHORIZED,
            ValidationRequired => StatusCode::BAD_REQUEST,
            TokenExpired => StatusCode::UNAUTHORIZED,
            TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthenticationFailed => StatusCode::UNAUTHORIZED,
            TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            IdentityHeader => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable failure kind, stable across releases.
    pub fn reason(&self) -> &'static str {
        use Error::*;
        match self {
            NotFound => "NotFound",
            InvalidCredential => "InvalidCredential",
            DirectoryUnavailable(_) => "DirectoryUnavailable",
            MalformedRequest => "MalformedRequest",
            ValidationRequired => "ValidationRequired",
            TokenExpired => "Expired",
            TokenInvalid => "Invalid",
            AuthenticationRequired => "AuthenticationRequired",
            AuthenticationFailed => "AuthenticationFailed",
            TokenCreation => "TokenCreation",
            IdentityHeader => "IdentityHeader",
        }
    }

    pub fn is_directory_failure(&self) -> bool {
        matches!(
            self,
            Error::NotFound | Error::InvalidCredential | Error::DirectoryUnavailable(_)
        )
    }

    // Directory outcomes reveal whether a user exists and how the directory is reached.
    pub fn public(self, expose_details: bool) -> Self {
        if !expose_details && self.is_directory_failure() {
            Error::AuthenticationFailed
        } else {
            self
        }
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("error", &self.to_string())?;
        state.serialize_field("reason", self.reason())?;
        state.end()
    }
}

impl SingleLine for Error {
    fn single_lined(&self) -> String {
        self.to_string()
    }
}

impl ApiHeader for Error {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn success(&self) -> bool {
        false
    }
}

pub mod directory {
    pub use super::Error::{DirectoryUnavailable, InvalidCredential, NotFound};
}

pub mod session {
    pub use super::Error::{TokenCreation, TokenExpired, TokenInvalid};
}

pub mod auth {
    pub use super::Error::{AuthenticationRequired, IdentityHeader, MalformedRequest, ValidationRequired};
}
