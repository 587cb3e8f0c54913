//! Bracketed response codes.

use super::Capability;

/// Response code carried in `[...]` by status responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// Text the user must see.
    Alert,
    /// Capability list sent with the greeting or after LOGIN.
    Capability(Vec<Capability>),
    /// Mailbox was selected read-only.
    ReadOnly,
    /// Mailbox was selected read-write.
    ReadWrite,
    /// Target mailbox does not exist.
    TryCreate,
    /// Authentication failed (RFC 5530).
    AuthenticationFailed,
    /// Any other code, by name.
    Other(String),
}
