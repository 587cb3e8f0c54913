//! IMAP commands and their serialization.

mod serialize;
mod tag_generator;
mod types;

use crate::types::{Mailbox, SequenceSet};

pub use tag_generator::TagGenerator;
pub use types::FetchAttribute;

use serialize::{write_astring, write_fetch_attributes, write_mailbox};

/// Command sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// LOGIN with plaintext credentials.
    Login {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// LIST mailbox names.
    List {
        /// Reference name, usually empty.
        reference: String,
        /// Mailbox pattern with `*` and `%` wildcards.
        pattern: String,
    },
    /// SELECT a mailbox read-write.
    Select {
        /// Mailbox to select.
        mailbox: Mailbox,
    },
    /// FETCH data for a set of messages.
    Fetch {
        /// Messages to fetch.
        sequence: SequenceSet,
        /// Data items to return.
        items: Vec<FetchAttribute>,
    },
    /// LOGOUT.
    Logout,
}

impl Command {
    /// Command keyword, safe to log (never includes arguments).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::List { .. } => "LIST",
            Self::Select { .. } => "SELECT",
            Self::Fetch { .. } => "FETCH",
            Self::Logout => "LOGOUT",
        }
    }

    /// Serializes the command line, CRLF included, with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.name().as_bytes());

        match self {
            Self::Login { username, password } => {
                buf.push(b' ');
                write_astring(&mut buf, username);
                buf.push(b' ');
                write_astring(&mut buf, password);
            }
            Self::List { reference, pattern } => {
                buf.push(b' ');
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }
            Self::Select { mailbox } => {
                buf.push(b' ');
                write_mailbox(&mut buf, mailbox);
            }
            Self::Fetch { sequence, items } => {
                buf.push(b' ');
                buf.extend_from_slice(sequence.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_attributes(&mut buf, items);
            }
            Self::Logout => {}
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}
