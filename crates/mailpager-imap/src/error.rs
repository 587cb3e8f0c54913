//! Error types for the IMAP client.

use thiserror::Error;

/// Errors that can occur while talking to an IMAP server.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The host name cannot be used for TLS server verification.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// The configured server address is not `host[:port]`.
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    /// Response bytes do not follow the IMAP grammar.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte offset into the response where parsing stopped.
        position: usize,
        /// What the parser expected.
        message: String,
    },

    /// Server completed the command with NO.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server completed the command with BAD.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server sent BYE and is closing the connection.
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation is not valid in the current session state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Server sent data the client cannot work with.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using the IMAP [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
