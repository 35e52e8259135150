//! Process configuration, read from the environment.

use std::net::SocketAddr;

use marketplace_observability::{LogFormat, UnknownLogFormat};
use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "MARKETPLACE_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const ADMIN_USERNAME_VAR: &str = "MARKETPLACE_ADMIN_USERNAME";
pub const ADMIN_PASSWORD_VAR: &str = "MARKETPLACE_ADMIN_PASSWORD";
pub const LOG_FORMAT_VAR: &str = "MARKETPLACE_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a socket address: {value:?}")]
    InvalidBindAddr {
        var: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("{var} must not be blank")]
    Blank { var: &'static str },

    #[error(transparent)]
    LogFormat(#[from] UnknownLogFormat),
}

/// Administrator account created at startup when missing.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects in-memory storage.
    pub database_url: Option<String>,
    pub admin: AdminSeed,
    pub log_format: LogFormat,
    /// True when the admin credentials fell back to the built-in default.
    pub default_admin: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Unset and empty are treated alike.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let raw_addr = get(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
                source,
            })?;

        let log_format = match get(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let username = get(ADMIN_USERNAME_VAR);
        let password = lookup(ADMIN_PASSWORD_VAR);
        if matches!(password.as_deref(), Some("")) {
            return Err(ConfigError::Blank {
                var: ADMIN_PASSWORD_VAR,
            });
        }
        let default_admin = username.is_none() && password.is_none();

        Ok(Self {
            bind_addr,
            database_url: get(DATABASE_URL_VAR),
            admin: AdminSeed {
                username: username.map_or_else(|| DEFAULT_ADMIN.to_string(), |u| u.trim().to_string()),
                password: password.unwrap_or_else(|| DEFAULT_ADMIN.to_string()),
            },
            log_format,
            default_admin,
        })
    }
}
