//! Decoding errors.

/// Result type alias for message decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a message cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A header line is neither `Name: value` nor a continuation.
    #[error("Invalid header line: {0}")]
    InvalidHeader(String),

    /// A Content-Type value has no `type/subtype`.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// A base64 body does not decode.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// A multipart entity without a `boundary` parameter.
    #[error("Multipart entity has no boundary")]
    MissingBoundary,

    /// A header the message cannot do without is absent or empty.
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    /// An address list that does not parse.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A Date header that is not an RFC 2822 date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
