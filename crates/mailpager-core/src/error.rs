//! Error types for the core library.

use std::time::Duration;

use thiserror::Error;

/// Failures that end synchronization.
///
/// None of them is retried: the session is unusable afterwards.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server cannot be reached or did not greet us.
    #[error("cannot connect to {server}: {source}")]
    Connection {
        /// `host:port` that was dialled.
        server: String,
        /// Underlying protocol error.
        source: mailpager_imap::Error,
    },

    /// LOGIN was rejected.
    #[error("login failed: {0}")]
    Authentication(#[source] mailpager_imap::Error),

    /// LIST failed.
    #[error("cannot list mailboxes: {0}")]
    List(#[source] mailpager_imap::Error),

    /// SELECT failed.
    #[error("cannot select mailbox: {0}")]
    Select(#[source] mailpager_imap::Error),

    /// FETCH of a range failed.
    #[error("cannot fetch messages {range}: {source}")]
    Fetch {
        /// Inclusive range, e.g. `16:40`.
        range: String,
        /// Underlying protocol error.
        source: mailpager_imap::Error,
    },

    /// The server's answer to a FETCH left out a message of the range.
    #[error("fetch of messages {range} returned nothing for message {missing}")]
    Incomplete {
        /// Inclusive range, e.g. `16:40`.
        range: String,
        /// First sequence number without a record.
        missing: u32,
    },

    /// A fetched message could not be decoded.
    #[error("cannot decode message {seq}: {source}")]
    Decode {
        /// Sequence number of the message.
        seq: u32,
        /// What was wrong with it.
        source: DecodeError,
    },

    /// A protocol call took longer than the configured limit.
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        /// `connect`, `select` or `fetch`.
        operation: &'static str,
        /// The limit that was exceeded.
        after: Duration,
    },
}

/// Why a fetch record did not become a message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The server answered without a `BODY[]` section.
    #[error("no body section in fetch response")]
    MissingBody,

    /// The message bytes are not a valid message.
    #[error(transparent)]
    Mime(#[from] mailpager_mime::Error),
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable has a value that cannot be used.
    #[error("{key} has an invalid value: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// `IMAP_SERVER` is not `host[:port]`.
    #[error("IMAP_SERVER is not host[:port]: {0:?}")]
    InvalidServer(String),
}
