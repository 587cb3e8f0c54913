//! Pieces shared by several response kinds.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{Capability, ListResponse, Mailbox, MailboxAttribute, ResponseCode};

/// Parses `[CODE args]` after a status keyword.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    match lexer.next_token()? {
        Token::LBracket => {}
        _ => return Err(lexer.error("expected '[' opening a response code")),
    }

    let name = lexer.read_atom_string()?;
    let code = match name.to_ascii_uppercase().as_str() {
        "ALERT" => ResponseCode::Alert,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "AUTHENTICATIONFAILED" => ResponseCode::AuthenticationFailed,
        "CAPABILITY" => ResponseCode::Capability(parse_capability_data(lexer)?),
        _ => ResponseCode::Other(name.to_string()),
    };

    // Arguments of codes we do not model (UIDNEXT, PERMANENTFLAGS, ...)
    // may contain parentheses, so skip raw bytes up to the bracket.
    while lexer.peek().is_some_and(|b| b != b']' && b != b'\r') {
        lexer.next_raw();
    }
    lexer.expect_rbracket()?;
    Ok(code)
}

/// Parses the space-separated atoms following `CAPABILITY`.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.expect_space()?;
        match lexer.next_token()? {
            Token::Atom(s) => caps.push(Capability::parse(s)),
            Token::Number(n) => caps.push(Capability::Other(n.to_string())),
            _ => return Err(lexer.error("expected capability name")),
        }
    }
    Ok(caps)
}

/// Parses a parenthesized list of atoms such as `(\Seen \Draft)`.
pub fn parse_atom_list(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    lexer.expect_lparen()?;
    let mut atoms = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok(atoms),
            Token::Space => {}
            Token::Atom(s) => atoms.push(s.to_string()),
            // `\*` in PERMANENTFLAGS lexes as atom `\` followed by `*`.
            Token::Asterisk => {
                if let Some(last) = atoms.last_mut() {
                    last.push('*');
                }
            }
            _ => return Err(lexer.error("unexpected token in list")),
        }
    }
}

/// Parses the body of a LIST response: attributes, delimiter and name.
pub fn parse_list_response(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    let attributes = parse_atom_list(lexer)?
        .iter()
        .map(|a| MailboxAttribute::parse(a))
        .collect();
    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        _ => return Err(lexer.error("expected hierarchy delimiter")),
    };
    lexer.expect_space()?;

    let name = lexer.read_astring()?;
    Ok(ListResponse {
        attributes,
        delimiter,
        mailbox: Mailbox::new(name),
    })
}
