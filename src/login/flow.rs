use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use hyper::{
    header::{self, HeaderValue},
    HeaderMap, StatusCode,
};
use serde::Deserialize;

use super::page::{Banner, LoginPage};
use crate::directory::Directory;
use crate::session::{SessionCookie, SessionTokens};

const MISSING_FIELDS: &str = "Please enter both username and password.";
const LOGIN_FAILED: &str = "Login failed. Please check your username and password.";
const LOGGED_OUT: &str = "You have been logged out. Please sign in again.";

#[derive(Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Interactive login: renders the prompt, exchanges credentials for a session cookie.
pub struct LoginFlow {
    directory: Arc<dyn Directory>,
    tokens: Arc<SessionTokens>,
    cookie: SessionCookie,
    page: LoginPage,
    default_redirect: String,
}

impl LoginFlow {
    pub fn new(
        directory: Arc<dyn Directory>,
        tokens: Arc<SessionTokens>,
        cookie: SessionCookie,
        page: LoginPage,
        default_redirect: String,
    ) -> Self {
        Self {
            directory,
            tokens,
            cookie,
            page,
            default_redirect,
        }
    }

    pub fn display(&self, headers: &HeaderMap, redirect: Option<&str>) -> Response {
        let has_session = self
            .cookie
            .extract(headers)
            .map(|token| self.tokens.verify_token(&token).is_ok())
            .unwrap_or(false);
        if has_session {
            return self.redirect(redirect, None);
        }

        self.prompt(StatusCode::OK, Banner::None, "", redirect, None)
    }

    pub async fn submit(&self, form: LoginForm, redirect: Option<&str>) -> Response {
        let username = form.username.trim();
        if username.is_empty() || form.password.is_empty() {
            return self.prompt(StatusCode::BAD_REQUEST, Banner::Error(MISSING_FIELDS), username, redirect, None);
        }

        // Which step failed stays in the logs, users only learn that login failed.
        let identity = match self.directory.verify_credentials(username, &form.password).await {
            Ok(identity) => identity,
            Err(err) => {
                log::info!("Login failed for {}: {}", username, err);
                return self.prompt(StatusCode::UNAUTHORIZED, Banner::Error(LOGIN_FAILED), username, redirect, None);
            }
        };

        let cookie = match self.tokens.create_token(&identity) {
            Ok(token) => self.cookie.set(&token, self.tokens.lifetime()),
            Err(err) => {
                log::error!("Cannot open session for {}: {}", username, err);
                return self.prompt(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Banner::Error(LOGIN_FAILED),
                    username,
                    redirect,
                    None,
                );
            }
        };
        log::info!(
            "Login successful for {}, redirecting to {}",
            username,
            self.target(redirect)
        );
        self.redirect(redirect, cookie)
    }

    // Only the cookie is dropped, an already issued token stays valid until it expires.
    pub fn logout(&self) -> Response {
        self.prompt(StatusCode::OK, Banner::Info(LOGGED_OUT), "", None, self.cookie.clear())
    }

    fn target<'a>(&'a self, redirect: Option<&'a str>) -> &'a str {
        redirect
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.default_redirect)
    }

    fn redirect(&self, redirect: Option<&str>, cookie: Option<HeaderValue>) -> Response {
        let target = self.target(redirect);
        let location = match HeaderValue::from_str(target) {
            Ok(location) => location,
            Err(_) => {
                log::debug!(
                    "Redirect target {:?} is not a valid Location, using {}",
                    target,
                    self.default_redirect
                );
                HeaderValue::from_str(&self.default_redirect).unwrap_or_else(|_| HeaderValue::from_static("/"))
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, location);
        if let Some(cookie) = cookie {
            headers.insert(header::SET_COOKIE, cookie);
        }
        (StatusCode::SEE_OTHER, headers).into_response()
    }

    fn prompt(
        &self,
        status: StatusCode,
        banner: Banner,
        username: &str,
        redirect: Option<&str>,
        cookie: Option<HeaderValue>,
    ) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(header::SET_COOKIE, cookie);
        }
        (status, headers, self.page.render(banner, username, redirect)).into_response()
    }
}
