use std::sync::Arc;

use axum::Extension;
use hyper::{
    header::{self, HeaderValue},
    HeaderMap, StatusCode,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Serialize, Serializer};

use super::{AuthDecision, AuthDecisionStrategy, ErrorDetails};
use crate::directory::DirectoryIdentity;
use crate::error::{auth as AuthError, Error};
use crate::response::{negotiated, ApiHeader, ApiResponse, Negotiated, SingleLine};

// Everything but RFC 3986 unreserved characters, so DNs with non-ASCII text survive header transport.
const DN_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

const X_AUTH_USER: &str = "x-auth-user";
const X_AUTH_STATUS: &str = "x-auth-status";
const X_AUTH_DN: &str = "x-auth-dn";

pub fn encode_dn(dn: &str) -> String {
    utf8_percent_encode(dn, DN_ENCODE_SET).to_string()
}

#[derive(Serialize)]
pub struct Authenticated {
    status: &'static str,
    user: String,
    #[serde(skip)]
    headers: HeaderMap,
}

impl Authenticated {
    // No identity header may be missing from a success.
    fn new(identity: DirectoryIdentity) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        // Usernames are not restricted to ASCII, raw UTF-8 is still a valid header value.
        let user = HeaderValue::from_bytes(identity.username.as_bytes()).map_err(|_| {
            log::error!("Cannot forward username {:?} in a header", identity.username);
            AuthError::IdentityHeader
        })?;
        let dn = HeaderValue::from_str(&encode_dn(&identity.dn)).map_err(|_| AuthError::IdentityHeader)?;
        headers.insert(X_AUTH_USER, user);
        headers.insert(X_AUTH_STATUS, HeaderValue::from_static("OK"));
        headers.insert(X_AUTH_DN, dn);

        Ok(Self {
            status: "authenticated",
            user: identity.username,
            headers,
        })
    }
}

impl ApiHeader for Authenticated {
    fn additional_headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}

impl SingleLine for Authenticated {
    fn single_lined(&self) -> String {
        self.user.clone()
    }
}

pub struct Denied {
    error: Error,
    challenge: Option<HeaderValue>,
}

impl ApiHeader for Denied {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn additional_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(challenge) = &self.challenge {
            if self.status_code() == StatusCode::UNAUTHORIZED {
                headers.insert(header::WWW_AUTHENTICATE, challenge.clone());
            }
        }
        headers
    }

    fn success(&self) -> bool {
        false
    }
}

impl Serialize for Denied {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.error.serialize(serializer)
    }
}

impl SingleLine for Denied {
    fn single_lined(&self) -> String {
        self.error.single_lined()
    }
}

pub(super) async fn handler(
    Extension(strategy): Extension<Arc<dyn AuthDecisionStrategy>>,
    Extension(details): Extension<ErrorDetails>,
    negotiation: Option<Negotiated>,
    headers: HeaderMap,
) -> Result<ApiResponse<Authenticated>, ApiResponse<Denied>> {
    let response_type = negotiated(negotiation);
    let decision = match strategy.decide(&headers).await {
        AuthDecision::Allow(identity) => Authenticated::new(identity),
        AuthDecision::Deny(error) => Err(error),
    };
    decision
        .map(|authenticated| response_type.to_api_response(authenticated))
        .map_err(|error| {
            response_type.to_api_response(Denied {
                error: error.public(details.exposed),
                challenge: strategy.challenge(),
            })
        })
}
