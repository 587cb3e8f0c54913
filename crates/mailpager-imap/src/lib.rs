//! # mailpager-imap
//!
//! The IMAP4rev1 subset a read-only mail pager needs: TLS transport,
//! LOGIN, LIST, SELECT and FETCH, with a sans-I/O response parser.
//!
//! ```no_run
//! use mailpager_imap::{Client, Config, FetchAttribute, Security, SequenceSet};
//!
//! # async fn run() -> mailpager_imap::Result<()> {
//! let config = Config::from_address("imap.example.com:993", Security::Implicit)?;
//! let stream = mailpager_imap::connection::connect(&config).await?;
//! let client = Client::from_stream(stream).await?;
//! let mut client = client.login("user@example.com", "password").await?;
//! client.list("", "*").await?;
//!
//! let mut client = client.select("INBOX").await?;
//! let last = client.status().exists;
//! if let Some(set) = SequenceSet::range(last.saturating_sub(9).max(1), last) {
//!     for (seq, items) in client.fetch(&set, vec![FetchAttribute::full_message()]).await? {
//!         println!("{seq}: {} items", items.len());
//!     }
//! }
//! client.logout().await
//! # }
//! ```
//!
//! ## Session states
//!
//! ```text
//! NotAuthenticated ── login() ──→ Authenticated ── select() ──→ Selected
//!                                                                │  ▲
//!                                                                └──┘ reselect()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, TagGenerator};
pub use connection::{
    Authenticated, Client, Config, FramedStream, ImapStream, NotAuthenticated,
    ResponseAccumulator, Security, Selected,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Capability, ListResponse, Mailbox, MailboxAttribute, MailboxStatus, ResponseCode, SeqNum,
    SequenceSet, Status, Tag,
};
