use std::collections::HashMap;

use async_trait::async_trait;

use super::{Directory, DirectoryIdentity};
use crate::error::{directory as DirectoryError, Error};

struct Entry {
    dn: String,
    password: String,
    cn: Option<String>,
}

/// In-process stand-in for an LDAP server, used by handler tests.
#[derive(Default)]
pub struct MemoryDirectory {
    entries: HashMap<String, Entry>,
    unreachable: bool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, username: &str, password: &str, dn: &str, cn: Option<&str>) -> Self {
        self.entries.insert(
            username.to_owned(),
            Entry {
                dn: dn.to_owned(),
                password: password.to_owned(),
                cn: cn.map(ToOwned::to_owned),
            },
        );
        self
    }

    pub fn alice() -> Self {
        Self::new().with_user(
            "alice",
            "secret",
            "uid=alice,ou=users,dc=example,dc=com",
            Some("Alice Liddell"),
        )
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<DirectoryIdentity, Error> {
        self.check_reachability().await?;
        let entry = self.entries.get(username).ok_or(DirectoryError::NotFound)?;
        if password.is_empty() || entry.password != password {
            return Err(DirectoryError::InvalidCredential);
        }

        let attributes = entry
            .cn
            .iter()
            .map(|cn| ("cn".to_owned(), vec![cn.clone().into_bytes()]))
            .collect();
        Ok(DirectoryIdentity::new(entry.dn.clone(), username.to_owned(), attributes))
    }

    async fn check_reachability(&self) -> Result<(), Error> {
        if self.unreachable {
            return Err(DirectoryError::DirectoryUnavailable("connection refused".to_owned()));
        }
        Ok(())
    }

    fn address(&self) -> &str {
        "ldap://memory"
    }

    fn user_base(&self) -> &str {
        "ou=users,dc=example,dc=com"
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDirectory;
    use crate::{directory::Directory, error::Error};

    #[tokio::test]
    async fn verification() {
        let directory = MemoryDirectory::alice().with_user("bob", "hunter2", "uid=bob,dc=example", None);

        let identity = directory.verify_credentials("alice", "secret").await.unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.display_name, "Alice Liddell");

        let identity = directory.verify_credentials("bob", "hunter2").await.unwrap();
        assert_eq!(identity.display_name, "bob");

        for password in ["", "secret", "wrong"] {
            assert_eq!(
                directory.verify_credentials("carol", password).await.unwrap_err(),
                Error::NotFound
            );
        }
        assert_eq!(
            directory.verify_credentials("alice", "wrong").await.unwrap_err(),
            Error::InvalidCredential
        );
    }

    #[tokio::test]
    async fn unreachable() {
        let directory = MemoryDirectory::unreachable();
        assert!(directory.check_reachability().await.is_err());
        assert!(matches!(
            directory.verify_credentials("alice", "secret").await.unwrap_err(),
            Error::DirectoryUnavailable(_)
        ));
    }
}
