use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::error::Error;

pub use ldap::{LdapDirectory, LdapSettings};

mod ldap;
#[cfg(test)]
pub mod memory;

/// A user entry whose password was just verified by the directory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DirectoryIdentity {
    pub dn: String,
    pub username: String,
    pub display_name: String,
    pub mail: Option<String>,
    #[serde(rename = "attributes", serialize_with = "lossy_attributes")]
    pub raw_attributes: HashMap<String, Vec<Vec<u8>>>,
}

fn lossy_attributes<S>(attributes: &HashMap<String, Vec<Vec<u8>>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(attributes.iter().map(|(name, values)| {
        (
            name,
            values
                .iter()
                .map(|value| String::from_utf8_lossy(value))
                .collect::<Vec<_>>(),
        )
    }))
}

impl DirectoryIdentity {
    pub fn new(dn: String, username: String, raw_attributes: HashMap<String, Vec<Vec<u8>>>) -> Self {
        let first_text = |name: &str| {
            raw_attributes
                .get(name)
                .and_then(|values| values.first())
                .map(|value| String::from_utf8_lossy(value).into_owned())
                .filter(|value| !value.is_empty())
        };
        let display_name = first_text("cn").unwrap_or_else(|| username.clone());
        let mail = first_text("mail");

        Self {
            dn,
            username,
            display_name,
            mail,
            raw_attributes,
        }
    }
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<DirectoryIdentity, Error>;

    /// Binds with the service account only, no user lookup.
    async fn check_reachability(&self) -> Result<(), Error>;

    fn address(&self) -> &str;

    fn user_base(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::DirectoryIdentity;

    #[test]
    fn display_name_fallback() {
        let identity = DirectoryIdentity::new(
            "uid=alice,ou=users,dc=example,dc=com".to_owned(),
            "alice".to_owned(),
            HashMap::new(),
        );
        assert_eq!(identity.display_name, "alice");
        assert_eq!(identity.mail, None);

        let identity = DirectoryIdentity::new(
            "uid=bob,ou=users,dc=example,dc=com".to_owned(),
            "bob".to_owned(),
            HashMap::from([
                ("cn".to_owned(), vec!["Bob Marley".as_bytes().to_vec(), b"Robert".to_vec()]),
                ("mail".to_owned(), vec![b"bob@example.com".to_vec()]),
            ]),
        );
        assert_eq!(identity.display_name, "Bob Marley");
        assert_eq!(identity.mail.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn non_ascii_display_name() {
        let identity = DirectoryIdentity::new(
            "cn=홍길동,ou=users,dc=example,dc=com".to_owned(),
            "gildong".to_owned(),
            HashMap::from([("cn".to_owned(), vec!["홍길동".as_bytes().to_vec()])]),
        );
        assert_eq!(identity.display_name, "홍길동");
    }
}
