//! Where and how to connect.

use crate::{Error, Result};

/// Transport security of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// TLS from the first byte.
    #[default]
    Implicit,
    /// Plaintext. Only meant for local test servers.
    None,
}

impl Security {
    /// Well-known port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Implicit => 993,
            Self::None => 143,
        }
    }
}

/// Server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host name, also used for certificate verification.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Transport security.
    pub security: Security,
}

impl Config {
    /// Implicit TLS on port 993.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Security::Implicit.default_port(),
            security: Security::Implicit,
        }
    }

    /// Parses `host` or `host:port`.
    ///
    /// Without a port the default for `security` is used. Bracketed IPv6
    /// literals (`[::1]:993`) are accepted.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAddress`] for an empty host or a port that is not
    /// a number in `1..=65535`.
    pub fn from_address(address: &str, security: Security) -> Result<Self> {
        let address = address.trim();
        let invalid = || Error::InvalidAddress(address.to_string());

        let (host, port) = if let Some(rest) = address.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, None),
                _ => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
            }
        } else {
            match address.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (address, None),
            }
        };

        if host.is_empty() {
            return Err(invalid());
        }
        let port = match port {
            Some(p) => match p.parse::<u16>() {
                Ok(n) if n != 0 => n,
                _ => return Err(invalid()),
            },
            None => security.default_port(),
        };

        Ok(Self {
            host: host.to_string(),
            port,
            security,
        })
    }
}
