//! Header block parsing.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Header fields of a message or body part.
///
/// Names are matched case-insensitively; repeated fields keep every value
/// in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of `name`.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a header block, unfolding continuation lines.
    ///
    /// Both CRLF and bare LF line endings are accepted. Bytes that are not
    /// UTF-8 are replaced; encoded-words are left for the caller to decode.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHeader`] for a line without a colon, a continuation
    /// before the first field, or an empty field name.
    pub fn parse(block: &[u8]) -> Result<Self> {
        let text = String::from_utf8_lossy(block);
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }

            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = current.as_mut() else {
                    return Err(Error::InvalidHeader(line.to_string()));
                };
                value.push(' ');
                value.push_str(line.trim());
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(&name, value);
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidHeader(line.to_string()))?;
            let name = name.trim_end();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(Error::InvalidHeader(line.to_string()));
            }
            current = Some((name.to_string(), value.trim().to_string()));
        }

        if let Some((name, value)) = current {
            headers.add(&name, value);
        }
        Ok(headers)
    }
}

/// Splits raw bytes at the first empty line into header block and body.
///
/// With no empty line the whole input is headers and the body is empty.
#[must_use]
pub fn split_header_body(raw: &[u8]) -> (&[u8], &[u8]) {
    // A part may start with an empty line: no headers at all.
    if let Some(body) = raw.strip_prefix(b"\r\n").or_else(|| raw.strip_prefix(b"\n")) {
        return (&[], body);
    }
    let mut i = 0;
    while let Some(offset) = raw[i..].iter().position(|&b| b == b'\n') {
        let nl = i + offset;
        let rest = &raw[nl + 1..];
        if rest.starts_with(b"\r\n") {
            return (&raw[..=nl], &rest[2..]);
        }
        if rest.starts_with(b"\n") {
            return (&raw[..=nl], &rest[1..]);
        }
        i = nl + 1;
    }
    (raw, &[])
}
