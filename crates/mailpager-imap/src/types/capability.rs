//! Server capabilities and completion status.

/// Completion status of a tagged or status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed.
    Ok,
    /// Command failed for an operational reason.
    No,
    /// Command was rejected as malformed.
    Bad,
    /// Greeting for an already authenticated connection.
    PreAuth,
    /// Server is closing the connection.
    Bye,
}

impl Status {
    /// Returns true for OK and PREAUTH.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// Server capability advertised in CAPABILITY data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501).
    Imap4Rev1,
    /// `IMAP4rev2` (RFC 9051).
    Imap4Rev2,
    /// IDLE (RFC 2177).
    Idle,
    /// STARTTLS.
    StartTls,
    /// LOGIN is refused on this connection.
    LoginDisabled,
    /// SASL mechanism, e.g. `AUTH=PLAIN`.
    Auth(String),
    /// Anything else, kept verbatim.
    Other(String),
}

impl Capability {
    /// Parses a capability atom, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "IDLE" => Self::Idle,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            _ => upper.strip_prefix("AUTH=").map_or_else(
                || Self::Other(s.to_string()),
                |_| Self::Auth(s[5..].to_string()),
            ),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => f.write_str("IMAP4rev1"),
            Self::Imap4Rev2 => f.write_str("IMAP4rev2"),
            Self::Idle => f.write_str("IDLE"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::LoginDisabled => f.write_str("LOGINDISABLED"),
            Self::Auth(mechanism) => write!(f, "AUTH={mechanism}"),
            Self::Other(s) => f.write_str(s),
        }
    }
}
