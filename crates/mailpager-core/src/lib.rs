//! # mailpager-core
//!
//! The synchronization engine behind the mailpager terminal reader.
//!
//! This crate provides:
//! - [`MailboxStore`]: loaded messages in presentation order, deduplicated
//!   by sequence number
//! - [`SyncController`]: the single command loop that pages backwards
//!   through a mailbox and picks up new mail on refresh
//! - [`MessageList`]: the UI-side list rebuilt from [`SyncEvent`]s
//! - [`Config`]: settings from the environment
//! - [`ImapSource`]: the [`MailSource`] backed by an IMAP session

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod decode;
mod error;
mod imap_source;
mod source;
pub mod store;
pub mod sync;
pub mod view;

pub use config::Config;
pub use decode::{Decoder, MimeDecoder};
pub use error::{ConfigError, DecodeError, SyncError};
pub use imap_source::{AuthClient, ImapSource, SelectedClient};
pub use source::{MailSource, MailboxInfo, RawMessage};
pub use store::{MailboxStore, Message, Position};
pub use sync::{SyncCommand, SyncController, SyncEvent};
pub use view::{Applied, MessageList, MessageView};
