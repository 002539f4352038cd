use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::directory::DirectoryIdentity;
use crate::error::{session as SessionError, Error};
use crate::misc::unix_now;

pub use cookie::SessionCookie;

mod cookie;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "cn")]
    pub display_name: String,
    pub dn: String,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and checks HS256 session tokens. Nothing is stored server side,
/// a token stays valid until `exp` even after its cookie is cleared.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionTokens {
    pub fn new(secret: &[u8], lifetime: Duration) -> Option<Self> {
        if secret.len() < MIN_SECRET_LEN || lifetime.is_zero() {
            return None;
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against our own clock, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Some(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn create_token(&self, identity: &DirectoryIdentity) -> Result<String, Error> {
        self.create_token_at(identity, unix_now())
    }

    pub fn create_token_at(&self, identity: &DirectoryIdentity, issued_at: u64) -> Result<String, Error> {
        let claims = Claims {
            username: identity.username.clone(),
            display_name: identity.display_name.clone(),
            dn: identity.dn.clone(),
            iat: issued_at,
            exp: issued_at + self.lifetime.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|err| {
            log::error!("Cannot sign session token for {}: {}", identity.username, err);
            SessionError::TokenCreation
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        self.verify_token_at(token, unix_now())
    }

    pub fn verify_token_at(&self, token: &str, now: u64) -> Result<Claims, Error> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                log::debug!("Rejected session token: {}", err);
                SessionError::TokenInvalid
            })?
            .claims;

        if now >= claims.exp {
            return Err(SessionError::TokenExpired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::SessionTokens;
    use crate::{directory::DirectoryIdentity, error::Error, misc::unix_now};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";
    const LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

    fn identity() -> DirectoryIdentity {
        DirectoryIdentity::new(
            "cn=홍길동,ou=users,dc=example,dc=com".to_owned(),
            "gildong".to_owned(),
            HashMap::from([("cn".to_owned(), vec!["홍길동".as_bytes().to_vec()])]),
        )
    }

    #[test]
    fn secret() {
        assert!(SessionTokens::new(b"short", LIFETIME).is_none());
        assert!(SessionTokens::new(b"", LIFETIME).is_none());
        assert!(SessionTokens::new(SECRET, Duration::ZERO).is_none());
        assert!(SessionTokens::new(SECRET, LIFETIME).is_some());
    }

    #[test]
    fn round_trip() {
        let tokens = SessionTokens::new(SECRET, LIFETIME).unwrap();
        let token = tokens.create_token(&identity()).unwrap();

        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.username, "gildong");
        assert_eq!(claims.display_name, "홍길동");
        assert_eq!(claims.dn, "cn=홍길동,ou=users,dc=example,dc=com");
        assert_eq!(claims.exp - claims.iat, LIFETIME.as_secs());
    }

    #[test]
    fn expiry() {
        let tokens = SessionTokens::new(SECRET, LIFETIME).unwrap();
        let now = unix_now();
        let token = tokens.create_token_at(&identity(), now).unwrap();

        assert!(tokens.verify_token_at(&token, now + LIFETIME.as_secs() - 1).is_ok());
        // No leeway: valid strictly before exp.
        assert_eq!(
            tokens.verify_token_at(&token, now + LIFETIME.as_secs()).unwrap_err(),
            Error::TokenExpired
        );

        let stale = tokens
            .create_token_at(&identity(), now - LIFETIME.as_secs() - 10)
            .unwrap();
        assert_eq!(tokens.verify_token(&stale).unwrap_err(), Error::TokenExpired);
    }

    #[test]
    fn tampering() {
        let tokens = SessionTokens::new(SECRET, LIFETIME).unwrap();
        let token = tokens.create_token(&identity()).unwrap();

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}.{}{}", unsigned, flipped, &signature[1..]);
        assert_eq!(tokens.verify_token(&tampered).unwrap_err(), Error::TokenInvalid);

        assert_eq!(tokens.verify_token("not-a-token").unwrap_err(), Error::TokenInvalid);
        assert_eq!(tokens.verify_token("").unwrap_err(), Error::TokenInvalid);

        let other = SessionTokens::new(b"fedcba9876543210fedcba9876543210", LIFETIME).unwrap();
        assert_eq!(other.verify_token(&token).unwrap_err(), Error::TokenInvalid);
    }

    #[test]
    fn expired_and_forged() {
        let tokens = SessionTokens::new(SECRET, LIFETIME).unwrap();
        let other = SessionTokens::new(b"fedcba9876543210fedcba9876543210", LIFETIME).unwrap();
        let forged = other.create_token_at(&identity(), 0).unwrap();
        assert_eq!(tokens.verify_token(&forged).unwrap_err(), Error::TokenInvalid);
    }
}
