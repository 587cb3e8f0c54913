//! Tokenizer for server responses.
//!
//! The lexer works on one complete response, literals included, as
//! assembled by the framed stream. It never blocks and never allocates
//! for atoms, which borrow from the input.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Cursor over the bytes of one server response.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Starts at the first byte of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Looks at the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes one byte without tokenizing it.
    pub(crate) fn next_raw(&mut self) -> Option<u8> {
        self.bump()
    }

    /// Consumes the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match byte {
            b' ' => Some(Token::Space),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'[' => Some(Token::LBracket),
            b']' => Some(Token::RBracket),
            b'*' => Some(Token::Asterisk),
            b'+' => Some(Token::Plus),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        match byte {
            b'\r' if self.peek_at(1) == Some(b'\n') => {
                self.pos += 2;
                Ok(Token::Crlf)
            }
            b'\r' => Err(self.error("CR without LF")),
            b'"' => self.quoted(),
            b'{' => self.literal(),
            _ if is_atom_char(byte) => self.atom(),
            _ => Err(self.error(&format!("unexpected byte {byte:#04x}"))),
        }
    }

    fn quoted(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    Some(c @ (b'"' | b'\\')) => out.push(c),
                    Some(c) => return Err(self.error(&format!("bad escape \\{}", c as char))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(b'\r' | b'\n') | None => {
                    return Err(self.error("unterminated quoted string"));
                }
                Some(c) => out.push(c),
            }
        }
        // Some servers put 8-bit text in quoted strings; keep what we can.
        Ok(Token::QuotedString(String::from_utf8_lossy(&out).into_owned()))
    }

    fn literal(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.input[start..self.pos];
        // LITERAL+ / LITERAL- marker
        if self.peek() == Some(b'+') || self.peek() == Some(b'-') {
            self.pos += 1;
        }
        if self.bump() != Some(b'}') {
            return Err(self.error("malformed literal length"));
        }
        let size: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error("malformed literal length"))?;

        if self.bump() != Some(b'\r') || self.bump() != Some(b'\n') {
            return Err(self.error("literal length not followed by CRLF"));
        }
        let end = self.pos + size;
        let Some(data) = self.input.get(self.pos..end) else {
            return Err(self.error("literal runs past end of response"));
        };
        self.pos = end;
        Ok(Token::Literal(data.to_vec()))
    }

    fn atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("atom is not UTF-8"))?;

        if text.eq_ignore_ascii_case("NIL") {
            return Ok(Token::Nil);
        }
        // 64-bit values such as HIGHESTMODSEQ stay atoms.
        if text.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = text.parse()
        {
            return Ok(Token::Number(n));
        }
        Ok(Token::Atom(text))
    }

    /// Builds a parse error at the current offset.
    pub(crate) fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn unexpected(&self, wanted: &str, got: &Token<'_>) -> Error {
        self.error(&format!("expected {wanted}, found {}", got.describe()))
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::Space => Ok(()),
            other => Err(self.unexpected("space", &other)),
        }
    }

    /// Consumes `(`.
    pub fn expect_lparen(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::LParen => Ok(()),
            other => Err(self.unexpected("'('", &other)),
        }
    }

    /// Consumes `]`.
    pub fn expect_rbracket(&mut self) -> Result<()> {
        match self.next_token()? {
            Token::RBracket => Ok(()),
            other => Err(self.unexpected("']'", &other)),
        }
    }

    /// Reads an atom.
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            other => Err(self.unexpected("atom", &other)),
        }
    }

    /// Reads a number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            other => Err(self.unexpected("number", &other)),
        }
    }

    /// Reads an atom, number, quoted string or literal as text.
    pub fn read_astring(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::QuotedString(s) => Ok(s),
            Token::Literal(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            other => Err(self.unexpected("string", &other)),
        }
    }

    /// Reads `NIL` or a string, keeping literal bytes untouched.
    pub fn read_nstring_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(s) => Ok(Some(s.into_bytes())),
            Token::Literal(bytes) => Ok(Some(bytes)),
            other => Err(self.unexpected("NIL or string", &other)),
        }
    }

    /// Returns everything up to CRLF as text and consumes the CRLF.
    pub fn read_text_line(&mut self) -> String {
        let rest = self.remaining();
        let len = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .unwrap_or(rest.len());
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += (len + 2).min(rest.len());
        text
    }
}

/// Returns true for bytes allowed in an atom.
///
/// `\` is accepted so that flags and attributes like `\Seen` lex as one atom.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    b > 0x20
        && b < 0x7F
        && !matches!(b, b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'[' | b']')
}
