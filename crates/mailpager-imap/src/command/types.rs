//! FETCH data item selection.

/// Data item requested with FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message UID.
    Uid,
    /// Size of the message in octets.
    Rfc822Size,
    /// A body section.
    Body {
        /// Section specifier, `None` for the whole message (`BODY[]`).
        section: Option<String>,
        /// Use `BODY.PEEK`, which leaves `\Seen` untouched.
        peek: bool,
    },
}

impl FetchAttribute {
    /// The whole raw message, fetched without setting `\Seen`.
    #[must_use]
    pub const fn full_message() -> Self {
        Self::Body {
            section: None,
            peek: true,
        }
    }
}
