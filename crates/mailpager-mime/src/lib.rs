//! # mailpager-mime
//!
//! Decodes raw RFC 5322 messages into the fields a mail reader shows:
//! senders, recipients, date, subject, inline text bodies and attachments.
//!
//! ## Features
//!
//! - **Headers**: unfolding, case-insensitive lookup, RFC 2047 encoded-words
//! - **Addresses**: display names, quoted names, comments and groups
//! - **Bodies**: recursive multipart walk, base64 and quoted-printable,
//!   UTF-8 / ISO-8859-1 / Windows-1252 charsets
//!
//! ## Quick Start
//!
//! ```
//! use mailpager_mime::Message;
//!
//! let raw = b"From: Alice <alice@example.com>\r\n\
//!             Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
//!             Subject: =?utf-8?Q?H=C3=A9llo?=\r\n\
//!             \r\n\
//!             Hi Bob!";
//!
//! let message = Message::parse(raw)?;
//! assert_eq!(message.subject, "Héllo");
//! assert_eq!(message.body("text/plain"), Some("Hi Bob!"));
//! # Ok::<(), mailpager_mime::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use address::{Address, parse_address_list};
pub use content_type::{ContentDisposition, ContentType};
pub use encoding::TransferEncoding;
pub use error::{Error, Result};
pub use header::{Headers, split_header_body};
pub use message::{Message, Part, parse_date};
