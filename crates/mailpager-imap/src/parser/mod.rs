//! Sans-I/O parser for server responses.
//!
//! The [`Lexer`] turns one framed response into tokens and the
//! [`ResponseParser`] builds a [`Response`] from them.
//!
//! ```
//! use mailpager_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* 40 EXISTS\r\n").unwrap();
//! assert_eq!(response, Response::Untagged(UntaggedResponse::Exists(40)));
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{FetchItem, Response, ResponseParser, UntaggedResponse};
