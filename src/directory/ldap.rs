use std::{collections::HashMap, future::Future, time::Duration};

use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult, Scope, SearchEntry};

use super::{Directory, DirectoryIdentity};
use crate::error::{directory as DirectoryError, Error};

const RC_INVALID_CREDENTIALS: u32 = 49;
const USER_ATTRIBUTES: [&str; 2] = ["cn", "mail"];

#[derive(Clone, Debug)]
pub struct LdapSettings {
    pub address: String,
    pub user_base: String,
    pub bind_dn: String,
    pub bind_password: String,
    pub timeout: Duration,
}

// ldap3 always speaks LDAPv3 and never chases referrals, search references are left unresolved.
pub struct LdapDirectory {
    settings: LdapSettings,
}

impl LdapDirectory {
    pub fn new(settings: LdapSettings) -> Self {
        Self { settings }
    }

    // Every connection is unbound once `op` completes, whatever its outcome.
    async fn with_connection<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: FnOnce(Ldap) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let (conn, mut ldap) = LdapConnAsync::with_settings(
            LdapConnSettings::new().set_conn_timeout(self.settings.timeout),
            &self.settings.address,
        )
        .await
        .map_err(unavailable)?;
        ldap3::drive!(conn);

        let res = op(ldap.clone()).await;
        if let Err(err) = ldap.unbind().await {
            log::debug!("Cannot unbind from {}: {}", self.settings.address, err);
        }
        res
    }

    async fn service_bind(&self, ldap: &mut Ldap) -> Result<(), Error> {
        ldap.with_timeout(self.settings.timeout)
            .simple_bind(&self.settings.bind_dn, &self.settings.bind_password)
            .await
            .and_then(LdapResult::success)
            .map(|_| ())
            .map_err(unavailable)
    }

    async fn find_user(&self, username: &str) -> Result<SearchEntry, Error> {
        self.with_connection(|mut ldap| async move {
            self.service_bind(&mut ldap).await?;
            let (entries, _res) = ldap
                .with_timeout(self.settings.timeout)
                .search(
                    &self.settings.user_base,
                    Scope::Subtree,
                    &user_filter(username),
                    USER_ATTRIBUTES.to_vec(),
                )
                .await
                .and_then(|res| res.success())
                .map_err(unavailable)?;

            select_entry(username, entries.into_iter().map(SearchEntry::construct).collect())
        })
        .await
    }

    async fn user_bind(&self, dn: &str, password: &str) -> Result<(), Error> {
        self.with_connection(|mut ldap| async move {
            let res = ldap
                .with_timeout(self.settings.timeout)
                .simple_bind(dn, password)
                .await
                .map_err(unavailable)?;
            bind_outcome(res)
        })
        .await
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<DirectoryIdentity, Error> {
        // An empty password would turn the user bind into an anonymous one.
        if password.is_empty() {
            log::info!("Empty password submitted for {}", username);
            return Err(DirectoryError::InvalidCredential);
        }

        let entry = match self.find_user(username).await {
            Ok(entry) => entry,
            Err(err) => {
                log_failure(username, &err);
                return Err(err);
            }
        };
        log::info!("Found user: {}", entry.dn);

        if let Err(err) = self.user_bind(&entry.dn, password).await {
            log_failure(username, &err);
            return Err(err);
        }
        log::info!("Authentication successful for {}", username);

        Ok(identity_from_entry(username, entry))
    }

    async fn check_reachability(&self) -> Result<(), Error> {
        self.with_connection(|mut ldap| async move { self.service_bind(&mut ldap).await })
            .await
    }

    fn address(&self) -> &str {
        &self.settings.address
    }

    fn user_base(&self) -> &str {
        &self.settings.user_base
    }
}

fn unavailable(err: LdapError) -> Error {
    DirectoryError::DirectoryUnavailable(err.to_string())
}

fn log_failure(username: &str, err: &Error) {
    match err {
        Error::DirectoryUnavailable(cause) => log::error!("LDAP error while authenticating {}: {}", username, cause),
        err => log::info!("Authentication failed for {}: {}", username, err),
    }
}

fn user_filter(username: &str) -> String {
    format!("(&(objectClass=person)(uid={}))", ldap_escape(username))
}

fn select_entry(username: &str, mut entries: Vec<SearchEntry>) -> Result<SearchEntry, Error> {
    match entries.len() {
        0 => Err(DirectoryError::NotFound),
        1 => Ok(entries.remove(0)),
        n => {
            log::warn!("{} entries match {}, refusing ambiguous identity", n, username);
            Err(DirectoryError::NotFound)
        }
    }
}

fn bind_outcome(res: LdapResult) -> Result<(), Error> {
    match res.rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredential),
        _ => Err(DirectoryError::DirectoryUnavailable(format!("rc={} {}", res.rc, res.text))),
    }
}

fn identity_from_entry(username: &str, entry: SearchEntry) -> DirectoryIdentity {
    let mut attributes: HashMap<String, Vec<Vec<u8>>> = entry
        .attrs
        .into_iter()
        .map(|(name, values)| (name, values.into_iter().map(String::into_bytes).collect()))
        .collect();
    for (name, values) in entry.bin_attrs {
        attributes.entry(name).or_default().extend(values);
    }
    DirectoryIdentity::new(entry.dn, username.to_owned(), attributes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ldap3::{LdapResult, SearchEntry};

    use super::{bind_outcome, identity_from_entry, select_entry, user_filter};
    use crate::error::Error;

    fn entry(dn: &str, cn: Option<&str>) -> SearchEntry {
        SearchEntry {
            dn: dn.to_owned(),
            attrs: cn
                .map(|cn| HashMap::from([("cn".to_owned(), vec![cn.to_owned()])]))
                .unwrap_or_default(),
            bin_attrs: HashMap::new(),
        }
    }

    fn result(rc: u32) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: String::new(),
            refs: Vec::new(),
            ctrls: Vec::new(),
        }
    }

    #[test]
    fn filter() {
        assert_eq!(user_filter("alice"), "(&(objectClass=person)(uid=alice))");
        assert_eq!(
            user_filter("*)(uid=admin").to_ascii_lowercase(),
            r"(&(objectclass=person)(uid=\2a\29\28uid=admin))"
        );
    }

    #[test]
    fn selection() {
        assert_eq!(select_entry("alice", Vec::new()).unwrap_err(), Error::NotFound);
        assert_eq!(
            select_entry("alice", vec![entry("uid=alice,dc=example", None)]).unwrap().dn,
            "uid=alice,dc=example"
        );
        assert_eq!(
            select_entry(
                "alice",
                vec![entry("uid=alice,ou=a,dc=example", None), entry("uid=alice,ou=b,dc=example", None)]
            )
            .unwrap_err(),
            Error::NotFound
        );
    }

    #[test]
    fn bind() {
        assert!(bind_outcome(result(0)).is_ok());
        assert_eq!(bind_outcome(result(49)).unwrap_err(), Error::InvalidCredential);
        assert!(matches!(
            bind_outcome(result(52)).unwrap_err(),
            Error::DirectoryUnavailable(_)
        ));
    }

    #[test]
    fn identity() {
        let identity = identity_from_entry("alice", entry("uid=alice,dc=example", Some("Alice Liddell")));
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.dn, "uid=alice,dc=example");
        assert_eq!(identity.display_name, "Alice Liddell");
        assert_eq!(identity.raw_attributes["cn"], vec![b"Alice Liddell".to_vec()]);

        let identity = identity_from_entry("bob", entry("uid=bob,dc=example", None));
        assert_eq!(identity.display_name, "bob");
    }
}
