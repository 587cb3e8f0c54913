//! Settings read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use mailpager_imap::Security;

use crate::error::ConfigError;

/// Messages fetched per page when `MAILPAGER_PAGE_SIZE` is unset.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Protocol call limit when `MAILPAGER_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Mailbox browsed when `IMAP_MAILBOX` is unset.
pub const DEFAULT_MAILBOX: &str = "INBOX";

/// Everything needed to open and page through one mailbox.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Server endpoint.
    pub server: mailpager_imap::Config,
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Mailbox to browse.
    pub mailbox: String,
    /// Messages per page, at least 1.
    pub page_size: u32,
    /// Limit for each connect, select and fetch.
    pub timeout: Duration,
    /// Where to write logs. Logging is off without it.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when it is unset.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when `IMAP_SERVER`, `IMAP_USERNAME` or
    ///   `IMAP_PASSWORD` is unset
    /// - [`ConfigError::InvalidServer`] when `IMAP_SERVER` is not
    ///   `host[:port]`
    /// - [`ConfigError::InvalidValue`] for a malformed flag or number
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let address = require("IMAP_SERVER")?;
        let username = require("IMAP_USERNAME")?;
        let password = require("IMAP_PASSWORD")?;

        let security = match get("IMAP_TLS") {
            Some(value) => {
                if parse_flag("IMAP_TLS", &value)? {
                    Security::Implicit
                } else {
                    Security::None
                }
            }
            None => Security::Implicit,
        };
        let server = mailpager_imap::Config::from_address(&address, security)
            .map_err(|_| ConfigError::InvalidServer(address.clone()))?;

        let page_size = match get("MAILPAGER_PAGE_SIZE") {
            Some(value) => parse_positive("MAILPAGER_PAGE_SIZE", &value)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let timeout = match get("MAILPAGER_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(u64::from(parse_positive(
                "MAILPAGER_TIMEOUT_SECS",
                &value,
            )?)),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            server,
            username,
            password,
            mailbox: get("IMAP_MAILBOX").unwrap_or_else(|| DEFAULT_MAILBOX.to_string()),
            page_size,
            timeout,
            log_file: get("MAILPAGER_LOG").map(PathBuf::from),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mailbox", &self.mailbox)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}
