//! Decoding a complete message into the fields a reader displays.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::address::{Address, parse_address_list};
use crate::content_type::{ContentDisposition, ContentType};
use crate::encoding::{TransferEncoding, decode_charset, decode_rfc2047};
use crate::error::{Error, Result};
use crate::header::{Headers, split_header_body};

/// Multipart nesting beyond this depth is ignored.
const MAX_DEPTH: usize = 16;

/// One MIME entity: the message itself or a body part.
#[derive(Debug, Clone)]
pub struct Part {
    /// Entity headers.
    pub headers: Headers,
    /// Body as transmitted, still transfer-encoded.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a part from parsed headers and a raw body.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Splits `raw` into headers and body.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHeader`] when the header block is malformed.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (head, body) = split_header_body(raw);
        Ok(Self::new(Headers::parse(head)?, body.to_vec()))
    }

    /// Content type, `text/plain; charset=us-ascii` when absent or unparsable.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .and_then(|v| ContentType::parse(v).ok())
            .unwrap_or_else(ContentType::text_plain)
    }

    /// Content-Transfer-Encoding, 7bit when absent.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Content-Disposition, if present.
    #[must_use]
    pub fn disposition(&self) -> Option<ContentDisposition> {
        self.headers
            .get("content-disposition")
            .map(ContentDisposition::parse)
    }

    /// Body with the transfer encoding removed.
    ///
    /// # Errors
    ///
    /// [`Error::Base64Decode`] for a corrupt base64 body.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        self.transfer_encoding().decode(&self.body)
    }
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Senders; never empty for a parsed message.
    pub from: Vec<Address>,
    /// Primary recipients.
    pub to: Vec<Address>,
    /// Origination date.
    pub date: DateTime<FixedOffset>,
    /// Subject with encoded-words decoded, empty when absent.
    pub subject: String,
    /// Inline text bodies keyed by lowercase `type/subtype`.
    pub bodies: HashMap<String, String>,
    /// Attachments keyed by filename.
    pub attachments: HashMap<String, Vec<u8>>,
}

impl Message {
    /// Decodes a complete RFC 5322 message.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHeader`] for a malformed header block
    /// - [`Error::MissingHeader`] when `From` is missing or empty, or `Date`
    ///   is missing
    /// - [`Error::InvalidAddress`] / [`Error::InvalidDate`] for unparsable
    ///   `From`, `To` or `Date`
    /// - [`Error::MissingBoundary`] / [`Error::Base64Decode`] for broken
    ///   bodies
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let root = Part::parse(raw)?;
        let headers = &root.headers;

        let from = match headers.get("from") {
            Some(value) => parse_address_list(value)?,
            None => Vec::new(),
        };
        if from.is_empty() {
            return Err(Error::MissingHeader("From"));
        }
        let to = headers
            .get("to")
            .map(parse_address_list)
            .transpose()?
            .unwrap_or_default();
        let date = parse_date(headers.get("date").ok_or(Error::MissingHeader("Date"))?)?;
        let subject = headers.get("subject").map(decode_rfc2047).unwrap_or_default();

        let mut message = Self {
            from,
            to,
            date,
            subject,
            bodies: HashMap::new(),
            attachments: HashMap::new(),
        };
        message.collect_parts(&root, 0)?;
        Ok(message)
    }

    /// First sender.
    #[must_use]
    pub fn sender(&self) -> Option<&Address> {
        self.from.first()
    }

    /// Inline body of the given content type, e.g. `text/plain`.
    #[must_use]
    pub fn body(&self, content_type: &str) -> Option<&str> {
        self.bodies
            .get(&content_type.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn collect_parts(&mut self, part: &Part, depth: usize) -> Result<()> {
        let content_type = part.content_type();

        if content_type.is_multipart() {
            let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
            if depth >= MAX_DEPTH {
                return Ok(());
            }
            for raw in split_multipart(&part.body, boundary) {
                self.collect_parts(&Part::parse(raw)?, depth + 1)?;
            }
            return Ok(());
        }

        let disposition = part.disposition();
        let filename = disposition
            .as_ref()
            .and_then(ContentDisposition::filename)
            .or_else(|| content_type.name());
        let attached = disposition
            .as_ref()
            .is_some_and(ContentDisposition::is_attachment)
            || (filename.is_some() && !content_type.is_text());

        let data = part.decode_body()?;
        if attached {
            let name = filename
                .unwrap_or_else(|| format!("attachment-{}", self.attachments.len() + 1));
            self.attachments.insert(name, data);
        } else {
            let charset = content_type.charset().unwrap_or("us-ascii");
            self.bodies
                .insert(content_type.essence(), decode_charset(&data, charset));
        }
        Ok(())
    }
}

/// Parses an RFC 2822 date, ignoring a trailing `(comment)` and extra
/// whitespace.
///
/// # Errors
///
/// [`Error::InvalidDate`] when the value is not a valid date.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    let mut text = value.trim();
    if text.ends_with(')')
        && let Some(open) = text.rfind('(')
    {
        text = text[..open].trim_end();
    }
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    DateTime::parse_from_rfc2822(&normalized).map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Splits a multipart body into its raw parts.
///
/// The preamble and epilogue are dropped. A missing close delimiter ends the
/// last part at the end of input.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();
    let mut parts = Vec::new();
    let mut part_start: Option<usize> = None;
    let mut line_start = 0;

    while line_start < body.len() {
        let line_end = body[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |p| line_start + p);
        let next = (line_end + 1).min(body.len());
        let line = trim_trailing_space(&body[line_start..line_end]);

        if let Some(rest) = line.strip_prefix(delimiter) {
            let closing = rest.starts_with(b"--");
            if closing || rest.is_empty() {
                if let Some(start) = part_start {
                    parts.push(strip_line_break(&body[start..line_start]));
                }
                if closing {
                    return parts;
                }
                part_start = Some(next);
            }
        }
        line_start = next;
    }

    if let Some(start) = part_start
        && start < body.len()
    {
        parts.push(&body[start..]);
    }
    parts
}

fn trim_trailing_space(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map_or(0, |p| p + 1);
    &line[..end]
}

/// The line break before a delimiter belongs to the delimiter.
fn strip_line_break(part: &[u8]) -> &[u8] {
    let part = part.strip_suffix(b"\n").unwrap_or(part);
    part.strip_suffix(b"\r").unwrap_or(part)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    const SIMPLE: &[u8] = b"From: Alice <alice@example.com>\r\n\
To: bob@example.com, \"Carol, C\" <carol@example.com>\r\n\
Subject: =?utf-8?Q?Caf=C3=A9?= plans\r\n\
Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
\r\n\
See you there.\r\n";

    #[test]
    fn simple_message() {
        let message = Message::parse(SIMPLE).unwrap();
        assert_eq!(
            message.sender(),
            Some(&Address::with_name("Alice", "alice@example.com"))
        );
        assert_eq!(message.to.len(), 2);
        assert_eq!(message.subject, "Café plans");
        let date = message.date;
        assert_eq!((date.year(), date.month(), date.day()), (2025, 7, 1));
        assert_eq!(date.hour(), 10);
        assert_eq!(message.body("text/plain"), Some("See you there.\r\n"));
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn multipart_with_attachment() {
        let raw = b"From: a@example.com\r\n\
Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
\r\n\
preamble\r\n\
--outer\r\n\
Content-Type: multipart/alternative; boundary=inner\r\n\
\r\n\
--inner\r\n\
Content-Type: text/plain; charset=iso-8859-1\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
Caf=E9\r\n\
--inner\r\n\
Content-Type: text/html; charset=utf-8\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
PHA+SGk8L3A+\r\n\
--inner--\r\n\
--outer\r\n\
Content-Type: application/pdf; name=\"report.pdf\"\r\n\
Content-Disposition: attachment; filename=\"report.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0x\r\n\
--outer--\r\n\
epilogue\r\n";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.body("text/plain"), Some("Café"));
        assert_eq!(message.body("TEXT/HTML"), Some("<p>Hi</p>"));
        assert_eq!(message.attachments.get("report.pdf").unwrap(), b"%PDF-1");
    }

    #[test]
    fn inline_image_with_name_is_attachment() {
        let raw = b"From: a@example.com\r\n\
Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
Content-Type: multipart/related; boundary=b\r\n\
\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
\r\n\
first\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
\r\n\
second\r\n\
--b\r\n\
Content-Type: image/png; name=logo.png\r\n\
Content-Disposition: inline\r\n\
\r\n\
png\r\n\
--b--\r\n";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.body("text/plain"), Some("second"));
        assert_eq!(message.attachments.get("logo.png").unwrap(), b"png");
    }

    #[test]
    fn later_attachment_replaces_same_filename() {
        let raw = b"From: a@example.com\r\n\
Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
Content-Type: multipart/mixed; boundary=b\r\n\
\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
Content-Disposition: attachment; filename=notes.txt\r\n\
\r\n\
draft\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
Content-Disposition: attachment; filename=notes.txt\r\n\
\r\n\
final\r\n\
--b--\r\n";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments.get("notes.txt").unwrap(), b"final");
        assert_eq!(message.body("text/plain"), None);
    }

    #[test]
    fn missing_date_is_an_error() {
        let err = Message::parse(b"From: a@example.com\r\n\r\nbody").unwrap_err();
        assert!(matches!(err, Error::MissingHeader("Date")));
    }

    #[test]
    fn missing_from_is_an_error() {
        let err = Message::parse(b"Subject: hi\r\nDate: 1 Jul 2025 09:15:00 GMT\r\n\r\nbody")
            .unwrap_err();
        assert!(matches!(err, Error::MissingHeader("From")));
        let err = Message::parse(b"From:\r\nDate: 1 Jul 2025 09:15:00 GMT\r\n\r\nbody")
            .unwrap_err();
        assert!(matches!(err, Error::MissingHeader("From")));
    }

    #[test]
    fn bad_date_is_an_error() {
        let err = Message::parse(b"From: a@example.com\r\nDate: yesterday\r\n\r\n").unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
    }

    #[test]
    fn dates_with_comments() {
        let date = parse_date("Mon, 30 Jun 2025  08:00:00 +0000 (UTC)").unwrap();
        assert_eq!(date.day(), 30);
        let date = parse_date("1 Jul 2025 09:15:00 GMT").unwrap();
        assert_eq!(date.minute(), 15);
    }

    #[test]
    fn multipart_without_boundary() {
        let raw = b"From: a@example.com\r\n\
Date: 1 Jul 2025 09:15:00 GMT\r\n\
Content-Type: multipart/mixed\r\n\
\r\n\
x";
        assert!(matches!(Message::parse(raw), Err(Error::MissingBoundary)));
    }

    #[test]
    fn unknown_encoding_and_bad_content_type_fall_back() {
        let raw = b"From: a@example.com\r\n\
Date: Tue, 1 Jul 2025 10:52:37 +0200\r\n\
Content-Type: nonsense\r\n\
Content-Transfer-Encoding: x-custom\r\n\
\r\n\
as is";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.body("text/plain"), Some("as is"));
    }

    #[test]
    fn corrupt_base64_is_an_error() {
        let raw = b"From: a@example.com\r\n\
Date: 1 Jul 2025 09:15:00 GMT\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
***";
        assert!(matches!(Message::parse(raw), Err(Error::Base64Decode(_))));
    }

    #[test]
    fn unterminated_multipart_keeps_last_part() {
        let parts = split_multipart(b"--b\r\nA: 1\r\n\r\none\r\n--b\r\n\r\ntwo", "b");
        assert_eq!(parts, vec![&b"A: 1\r\n\r\none"[..], &b"\r\ntwo"[..]]);
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = Message::parse(&input);
        }

        #[test]
        fn headers_never_panic(input in "\\PC{0,200}") {
            let _ = Headers::parse(input.as_bytes());
        }
    }
}
