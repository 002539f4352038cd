use std::{net::IpAddr, time::Duration};

use clap::{ArgAction, ArgGroup, Parser};
use log::LevelFilter;

use crate::{
    auth::AuthMode,
    directory::LdapSettings,
    session::{SessionTokens, MIN_SECRET_LEN},
};

#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("user-base").required(true).multiple(true).args(&["ldap_base_dn", "ldap_user_base"])))]
pub struct Options {
    /// Increase logs verbosity (Error (default), Warn, Info, Debug, Trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub log_level: u8,
    /// HTTP listening address.
    #[arg(short = 'a', long, env = "LISTEN_ADDRESS", default_value = "127.0.0.1")]
    pub address: IpAddr,
    /// HTTP listening port.
    #[arg(short = 'p', long, env = "LISTEN_PORT", default_value = "8000")]
    pub port: u16,
    /// How /auth decides: signed session cookie or Basic authorization header.
    #[arg(short = 'm', long, env = "AUTH_MODE", value_enum, default_value = "cookie")]
    pub auth_mode: AuthMode,
    /// URI of the LDAP server used to authenticate users.
    #[arg(short = 'l', long, env = "LDAP_SERVER")]
    pub ldap_server: String,
    /// Directory base DN, users are searched under ou=users of it unless --ldap-user-base is set.
    #[arg(long, env = "LDAP_BASE_DN")]
    pub ldap_base_dn: Option<String>,
    /// Subtree searched for user entries.
    #[arg(long, env = "LDAP_USER_BASE")]
    pub ldap_user_base: Option<String>,
    /// Service account DN used to search users.
    #[arg(long, env = "LDAP_BIND_DN")]
    pub ldap_bind_dn: String,
    /// Service account password used to search users.
    #[arg(long, env = "LDAP_BIND_PASSWORD", hide_env_values = true)]
    pub ldap_bind_password: String,
    /// Connection and operation timeout of every LDAP round-trip.
    #[arg(long, env = "LDAP_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    pub ldap_timeout: Duration,
    /// Session token signing secret (at least 32 bytes), shared by every instance. Required in cookie mode.
    #[arg(short = 's', long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,
    /// Session token and cookie lifetime.
    #[arg(short = 'L', long, env = "SESSION_LIFETIME", default_value = "2h", value_parser = humantime::parse_duration)]
    pub session_lifetime: Duration,
    /// Name of the session cookie.
    #[arg(short = 'c', long, env = "COOKIE_NAME", default_value = "ldap_gate_session")]
    pub cookie_name: String,
    /// Location used after login when no redirect query parameter is given.
    #[arg(short = 'r', long, env = "DEFAULT_REDIRECT", default_value = "/")]
    pub default_redirect: String,
    /// Realm announced in Basic authentication challenges.
    #[arg(long, env = "AUTH_REALM", default_value = "ldap-gate")]
    pub realm: String,
    /// Return directory failure details from /auth and /validate (operators only).
    #[arg(long)]
    pub expose_error_details: bool,
    /// CSS color used in the login page.
    #[arg(short = 'T', long, default_value = "#667eea")]
    pub theme: String,
}

impl Options {
    pub fn log_level(&self) -> LevelFilter {
        use LevelFilter::*;
        match self.log_level {
            0 => Error,
            1 => Warn,
            2 => Info,
            3 => Debug,
            _ => Trace,
        }
    }

    pub fn user_base(&self) -> String {
        match (&self.ldap_user_base, &self.ldap_base_dn) {
            (Some(user_base), _) => user_base.clone(),
            (None, Some(base_dn)) => format!("ou=users,{}", base_dn),
            (None, None) => String::new(),
        }
    }

    pub fn ldap_settings(&self) -> LdapSettings {
        LdapSettings {
            address: self.ldap_server.clone(),
            user_base: self.user_base(),
            bind_dn: self.ldap_bind_dn.clone(),
            bind_password: self.ldap_bind_password.clone(),
            timeout: self.ldap_timeout,
        }
    }

    pub fn session_tokens(&self) -> Result<SessionTokens, String> {
        let secret = self
            .session_secret
            .as_deref()
            .ok_or("a session secret is required in cookie mode")?;
        SessionTokens::new(secret.as_bytes(), self.session_lifetime).ok_or_else(|| {
            format!(
                "session secret must be at least {} bytes and session lifetime non-zero",
                MIN_SECRET_LEN
            )
        })
    }
}
