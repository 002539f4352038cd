use std::sync::Arc;

use async_trait::async_trait;
use hyper::{header::HeaderValue, HeaderMap};

use super::{AuthMode, Credential};
use crate::directory::{Directory, DirectoryIdentity};
use crate::error::{auth as AuthError, Error};
use crate::session::{Claims, SessionCookie, SessionTokens};

#[derive(Debug, PartialEq)]
pub enum AuthDecision {
    Allow(DirectoryIdentity),
    Deny(Error),
}

/// How `/auth` turns an incoming subrequest into an identity.
#[async_trait]
pub trait AuthDecisionStrategy: Send + Sync {
    async fn decide(&self, headers: &HeaderMap) -> AuthDecision;

    fn mode(&self) -> AuthMode;

    /// Header sent with every denial, prompting the client for credentials.
    fn challenge(&self) -> Option<HeaderValue> {
        None
    }
}

pub struct CookieSession {
    tokens: Arc<SessionTokens>,
    cookie: SessionCookie,
}

impl CookieSession {
    pub fn new(tokens: Arc<SessionTokens>, cookie: SessionCookie) -> Self {
        Self { tokens, cookie }
    }
}

#[async_trait]
impl AuthDecisionStrategy for CookieSession {
    async fn decide(&self, headers: &HeaderMap) -> AuthDecision {
        let token = match self.cookie.extract(headers) {
            Some(token) => token,
            None => {
                log::info!("No session cookie found");
                return AuthDecision::Deny(AuthError::AuthenticationRequired);
            }
        };

        match self.tokens.verify_token(&token) {
            Ok(claims) => {
                log::info!("Authentication successful for {} via session", claims.username);
                AuthDecision::Allow(claims.into())
            }
            Err(err) => {
                log::info!("Invalid session: {}", err);
                AuthDecision::Deny(err)
            }
        }
    }

    fn mode(&self) -> AuthMode {
        AuthMode::Cookie
    }
}

pub struct BasicAuth {
    directory: Arc<dyn Directory>,
    realm: String,
}

impl BasicAuth {
    pub fn new(directory: Arc<dyn Directory>, realm: String) -> Self {
        Self { directory, realm }
    }
}

#[async_trait]
impl AuthDecisionStrategy for BasicAuth {
    async fn decide(&self, headers: &HeaderMap) -> AuthDecision {
        let credential = match Credential::from_headers(headers) {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                log::info!("No Authorization header provided");
                return AuthDecision::Deny(AuthError::AuthenticationRequired);
            }
            Err(err) => {
                log::info!("Invalid Authorization header format");
                return AuthDecision::Deny(err);
            }
        };

        match self
            .directory
            .verify_credentials(&credential.username, &credential.password)
            .await
        {
            Ok(identity) => AuthDecision::Allow(identity),
            Err(err) => AuthDecision::Deny(err),
        }
    }

    fn mode(&self) -> AuthMode {
        AuthMode::Basic
    }

    fn challenge(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!("Basic realm=\"{}\", charset=\"UTF-8\"", self.realm)).ok()
    }
}

impl From<Claims> for DirectoryIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            dn: claims.dn,
            username: claims.username,
            display_name: claims.display_name,
            mail: None,
            raw_attributes: Default::default(),
        }
    }
}
