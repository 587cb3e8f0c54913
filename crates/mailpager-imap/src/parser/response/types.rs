//! Parsed response data.

use crate::types::{Capability, ListResponse, ResponseCode, SeqNum};

/// One data item of a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// Unique identifier of the message.
    Uid(u32),
    /// Size of the message in octets.
    Rfc822Size(u32),
    /// Body section contents.
    Body {
        /// Section specifier, `None` for the whole message (`BODY[]`).
        section: Option<String>,
        /// Starting octet of a partial fetch.
        origin: Option<u32>,
        /// Section bytes, `None` when the server sent NIL.
        data: Option<Vec<u8>>,
    },
}

/// Data the server sends outside a command completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// Informational status.
    Ok {
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Warning.
    No {
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Protocol-level error not tied to a command.
    Bad {
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Greeting of a connection that needs no login.
    PreAuth {
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Server is about to close the connection.
    Bye {
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Capability listing.
    Capability(Vec<Capability>),
    /// One mailbox name from LIST.
    List(ListResponse),
    /// Flags defined in the selected mailbox, as raw atoms.
    Flags(Vec<String>),
    /// Number of messages in the mailbox.
    Exists(u32),
    /// Number of recent messages.
    Recent(u32),
    /// A message was removed.
    Expunge(SeqNum),
    /// Message data.
    Fetch {
        /// Sequence number of the message.
        seq: SeqNum,
        /// Returned items.
        items: Vec<FetchItem>,
    },
}
