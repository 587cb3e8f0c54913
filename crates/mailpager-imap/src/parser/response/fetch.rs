//! FETCH data items.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};

use super::types::FetchItem;

/// Parses the parenthesized item list after `* n FETCH `.
///
/// Items the client never asks for (FLAGS, ENVELOPE, MODSEQ, ...) are
/// skipped, since servers are free to include them unsolicited.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect_lparen()?;
    let mut items = Vec::new();

    loop {
        let name = match lexer.next_token()? {
            Token::RParen => return Ok(items),
            Token::Space => continue,
            Token::Atom(name) => name,
            _ => return Err(lexer.error("expected fetch item name")),
        };

        match name.to_ascii_uppercase().as_str() {
            "UID" => {
                lexer.expect_space()?;
                items.push(FetchItem::Uid(lexer.read_number()?));
            }
            "RFC822.SIZE" => {
                lexer.expect_space()?;
                items.push(FetchItem::Rfc822Size(lexer.read_number()?));
            }
            "BODY" if lexer.peek() == Some(b'[') => {
                let section = read_section(lexer)?;
                let origin = read_origin(lexer)?;
                lexer.expect_space()?;
                let data = lexer.read_nstring_bytes()?;
                items.push(FetchItem::Body {
                    section,
                    origin,
                    data,
                });
            }
            "RFC822" => {
                lexer.expect_space()?;
                let data = lexer.read_nstring_bytes()?;
                items.push(FetchItem::Body {
                    section: None,
                    origin: None,
                    data,
                });
            }
            _ => {
                if lexer.peek() == Some(b'[') {
                    read_section(lexer)?;
                    read_origin(lexer)?;
                }
                lexer.expect_space()?;
                skip_value(lexer)?;
            }
        }
    }
}

/// Reads `[section]`, returning `None` for the empty section.
fn read_section(lexer: &mut Lexer<'_>) -> Result<Option<String>> {
    lexer.next_raw();
    let mut section = String::new();
    loop {
        match lexer.next_raw() {
            Some(b']') => break,
            Some(b'\r') | None => return Err(lexer.error("unterminated body section")),
            Some(b) => section.push(char::from(b)),
        }
    }
    Ok((!section.is_empty()).then_some(section))
}

/// Reads an optional `<origin>` suffix.
fn read_origin(lexer: &mut Lexer<'_>) -> Result<Option<u32>> {
    if lexer.peek() != Some(b'<') {
        return Ok(None);
    }
    let atom = lexer.read_atom_string()?;
    atom.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .and_then(|s| s.parse().ok())
        .map(Some)
        .ok_or_else(|| lexer.error("malformed partial origin"))
}

/// Skips one value: an atom, number, string, NIL or a nested list.
fn skip_value(lexer: &mut Lexer<'_>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match lexer.next_token()? {
            Token::LParen => depth += 1,
            Token::RParen if depth > 0 => depth -= 1,
            Token::Crlf | Token::Eof | Token::RParen => {
                return Err(lexer.error("unexpected end of fetch item"));
            }
            _ => {}
        }
        if depth == 0 {
            return Ok(());
        }
    }
}
