//! Response parsing.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{parse_atom_list, parse_capability_data, parse_list_response, parse_response_code};

/// One complete server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Completion of the command with the same tag.
    Tagged {
        /// Tag of the completed command.
        tag: Tag,
        /// Completion status.
        status: Status,
        /// Response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Server data.
    Untagged(UntaggedResponse),
    /// Server is ready for more command data.
    Continuation {
        /// Text after `+`.
        text: String,
    },
}

/// Stateless parser from response bytes to [`Response`].
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one response, literals included, ending in CRLF.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);
        match lexer.next_token()? {
            Token::Asterisk => {
                lexer.expect_space()?;
                Self::untagged(&mut lexer).map(Response::Untagged)
            }
            Token::Plus => {
                if lexer.peek() == Some(b' ') {
                    lexer.expect_space()?;
                }
                Ok(Response::Continuation {
                    text: lexer.read_text_line(),
                })
            }
            Token::Atom(tag) => Self::tagged(&mut lexer, tag.to_string()),
            Token::Number(tag) => Self::tagged(&mut lexer, tag.to_string()),
            _ => Err(Error::Parse {
                position: 0,
                message: "response does not start with '*', '+' or a tag".to_string(),
            }),
        }
    }

    fn tagged(lexer: &mut Lexer<'_>, tag: String) -> Result<Response> {
        lexer.expect_space()?;
        let keyword = lexer.read_atom_string()?;
        let status = parse_status(keyword).ok_or_else(|| lexer.error("unknown completion status"))?;
        let (code, text) = Self::resp_text(lexer)?;
        Ok(Response::Tagged {
            tag: Tag(tag),
            status,
            code,
            text,
        })
    }

    fn untagged(lexer: &mut Lexer<'_>) -> Result<UntaggedResponse> {
        match lexer.next_token()? {
            Token::Atom(keyword) => Self::server_data(lexer, keyword),
            Token::Number(n) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom_string()?;
                Self::message_data(lexer, n, keyword)
            }
            _ => Err(lexer.error("expected keyword or number after '*'")),
        }
    }

    fn server_data(lexer: &mut Lexer<'_>, keyword: &str) -> Result<UntaggedResponse> {
        let upper = keyword.to_ascii_uppercase();
        if let Some(status) = parse_status(&upper) {
            let (code, text) = Self::resp_text(lexer)?;
            return Ok(match status {
                Status::Ok => UntaggedResponse::Ok { code, text },
                Status::No => UntaggedResponse::No { code, text },
                Status::Bad => UntaggedResponse::Bad { code, text },
                Status::PreAuth => UntaggedResponse::PreAuth { code, text },
                Status::Bye => UntaggedResponse::Bye { code, text },
            });
        }

        match upper.as_str() {
            "CAPABILITY" => Ok(UntaggedResponse::Capability(parse_capability_data(lexer)?)),
            "LIST" => {
                lexer.expect_space()?;
                Ok(UntaggedResponse::List(parse_list_response(lexer)?))
            }
            "FLAGS" => {
                lexer.expect_space()?;
                Ok(UntaggedResponse::Flags(parse_atom_list(lexer)?))
            }
            _ => Err(lexer.error(&format!("unsupported server data {keyword}"))),
        }
    }

    fn message_data(lexer: &mut Lexer<'_>, n: u32, keyword: &str) -> Result<UntaggedResponse> {
        match keyword.to_ascii_uppercase().as_str() {
            "EXISTS" => Ok(UntaggedResponse::Exists(n)),
            "RECENT" => Ok(UntaggedResponse::Recent(n)),
            "EXPUNGE" => Ok(UntaggedResponse::Expunge(Self::seq(lexer, n)?)),
            "FETCH" => {
                let seq = Self::seq(lexer, n)?;
                lexer.expect_space()?;
                let items = fetch::parse_fetch_response(lexer)?;
                Ok(UntaggedResponse::Fetch { seq, items })
            }
            _ => Err(lexer.error(&format!("unsupported message data {keyword}"))),
        }
    }

    fn seq(lexer: &Lexer<'_>, n: u32) -> Result<SeqNum> {
        SeqNum::new(n).ok_or_else(|| lexer.error("sequence number 0"))
    }

    /// Parses `[code] text` following a status keyword.
    fn resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        // Some servers omit the text, and the space, entirely.
        if lexer.peek() != Some(b' ') {
            return Ok((None, lexer.read_text_line()));
        }
        lexer.expect_space()?;
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };
        if lexer.peek() == Some(b' ') {
            lexer.expect_space()?;
        }
        Ok((code, lexer.read_text_line()))
    }
}

fn parse_status(keyword: &str) -> Option<Status> {
    match keyword.to_ascii_uppercase().as_str() {
        "OK" => Some(Status::Ok),
        "NO" => Some(Status::No),
        "BAD" => Some(Status::Bad),
        "PREAUTH" => Some(Status::PreAuth),
        "BYE" => Some(Status::Bye),
        _ => None,
    }
}
