//! Content-Type and Content-Disposition values.

use std::collections::HashMap;
use std::fmt;

use crate::encoding::decode_rfc2047;
use crate::error::{Error, Result};

/// Parsed Content-Type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Lowercase main type, e.g. `text`.
    pub main_type: String,
    /// Lowercase subtype, e.g. `plain`.
    pub sub_type: String,
    /// Parameters with lowercase names.
    pub parameters: HashMap<String, String>,
}

impl ContentType {
    /// Content type without parameters.
    #[must_use]
    pub fn new(main_type: &str, sub_type: &str) -> Self {
        Self {
            main_type: main_type.to_ascii_lowercase(),
            sub_type: sub_type.to_ascii_lowercase(),
            parameters: HashMap::new(),
        }
    }

    /// `text/plain; charset=us-ascii`, the default for entities without
    /// a Content-Type (RFC 2045 section 5.2).
    #[must_use]
    pub fn text_plain() -> Self {
        let mut ct = Self::new("text", "plain");
        ct.parameters
            .insert("charset".to_string(), "us-ascii".to_string());
        ct
    }

    /// Parses `type/subtype; name=value; ...`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidContentType`] when the `type/subtype` part is missing
    /// or either half is empty.
    pub fn parse(value: &str) -> Result<Self> {
        let mut pieces = split_parameters(value).into_iter();
        let essence = pieces.next().unwrap_or_default();
        let (main, sub) = essence
            .split_once('/')
            .map(|(m, s)| (m.trim(), s.trim()))
            .filter(|(m, s)| !m.is_empty() && !s.is_empty())
            .ok_or_else(|| Error::InvalidContentType(value.to_string()))?;

        let mut ct = Self::new(main, sub);
        ct.parameters = collect_parameters(pieces);
        Ok(ct)
    }

    /// `type/subtype` in lowercase.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// The `charset` parameter.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// The `boundary` parameter of a multipart type.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary").map(String::as_str)
    }

    /// The legacy `name` parameter, sometimes used instead of a filename.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.parameters.get("name").map(|n| decode_rfc2047(n))
    }

    /// Returns true for `multipart/*`.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }

    /// Returns true for `text/*`.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type == "text"
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)
    }
}

/// Parsed Content-Disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Lowercase disposition type, usually `inline` or `attachment`.
    pub kind: String,
    /// Parameters with lowercase names.
    pub parameters: HashMap<String, String>,
}

impl ContentDisposition {
    /// Parses `attachment; filename="a.pdf"`. Never fails: an empty value
    /// gives an empty kind.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut pieces = split_parameters(value).into_iter();
        let kind = pieces.next().unwrap_or_default().trim().to_ascii_lowercase();
        Self {
            kind,
            parameters: collect_parameters(pieces),
        }
    }

    /// Returns true for the `attachment` disposition.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.kind == "attachment"
    }

    /// The `filename` parameter with encoded-words decoded.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.parameters.get("filename").map(|n| decode_rfc2047(n))
    }
}

/// Splits a header value on `;` outside quoted strings.
fn split_parameters(value: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ';' if !quoted => pieces.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    pieces.push(current);
    pieces
}

fn collect_parameters(pieces: impl Iterator<Item = String>) -> HashMap<String, String> {
    pieces
        .filter_map(|piece| {
            let (name, value) = piece.split_once('=')?;
            let name = name.trim().to_ascii_lowercase();
            (!name.is_empty()).then(|| (name, unquote(value.trim())))
        })
        .collect()
}

/// Strips surrounding double quotes and resolves backslash escapes.
pub(crate) fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
