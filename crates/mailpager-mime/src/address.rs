//! RFC 5322 address lists.

use std::fmt;

use crate::content_type::unquote;
use crate::encoding::decode_rfc2047;
use crate::error::{Error, Result};

/// One mailbox from an address header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// Display name with encoded-words decoded.
    pub name: Option<String>,
    /// `local@domain`.
    pub email: String,
}

impl Address {
    /// Address without display name.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Address with display name.
    #[must_use]
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Parses an address list such as a `From`, `To` or `Cc` value.
///
/// Groups (`Team: a@x, b@y;`) are flattened into their members. An empty
/// value yields an empty list.
///
/// # Errors
///
/// [`Error::InvalidAddress`] when any entry is not a valid mailbox.
pub fn parse_address_list(value: &str) -> Result<Vec<Address>> {
    split_entries(value)
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(parse_mailbox)
        .collect()
}

/// Splits on top-level `,`, dropping group names and group terminators.
fn split_entries(value: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    let mut angle = false;
    let mut comment_depth = 0usize;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted || comment_depth > 0 => {
                current.push(c);
                escaped = true;
            }
            '"' if comment_depth == 0 => {
                quoted = !quoted;
                current.push(c);
            }
            _ if quoted => current.push(c),
            '(' => {
                comment_depth += 1;
                current.push(c);
            }
            ')' if comment_depth > 0 => {
                comment_depth -= 1;
                current.push(c);
            }
            _ if comment_depth > 0 => current.push(c),
            '<' => {
                angle = true;
                current.push(c);
            }
            '>' => {
                angle = false;
                current.push(c);
            }
            _ if angle => current.push(c),
            // Group display name.
            ':' => current.clear(),
            ',' | ';' => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries
}

fn parse_mailbox(entry: &str) -> Result<Address> {
    let invalid = || Error::InvalidAddress(entry.to_string());

    if let Some(open) = angle_start(entry) {
        let rest = &entry[open + 1..];
        let close = rest.find('>').ok_or_else(invalid)?;
        let trailing = rest[close + 1..].trim();
        if !trailing.is_empty() && !trailing.starts_with('(') {
            return Err(invalid());
        }
        let email = rest[..close].trim();
        if !is_valid_email(email) {
            return Err(invalid());
        }
        let name = decode_rfc2047(&unquote(entry[..open].trim()));
        let name = name.trim();
        return Ok(Address {
            name: (!name.is_empty()).then(|| name.to_string()),
            email: email.to_string(),
        });
    }

    // Bare `local@domain`, optionally followed by `(Display Name)`.
    let (email, comment) = match entry.find('(') {
        Some(open) => {
            let close = entry.rfind(')').filter(|&c| c > open).ok_or_else(invalid)?;
            (entry[..open].trim(), entry[open + 1..close].trim())
        }
        None => (entry.trim(), ""),
    };
    if !is_valid_email(email) {
        return Err(invalid());
    }
    let name = decode_rfc2047(comment);
    Ok(Address {
        name: (!name.is_empty()).then_some(name),
        email: email.to_string(),
    })
}

/// Byte offset of the first `<` outside a quoted display name.
fn angle_start(entry: &str) -> Option<usize> {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in entry.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '<' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !email
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '(' | ')' | ',' | ';'))
}
