//! Wire encoding helpers for command arguments.

use crate::types::Mailbox;

use super::types::FetchAttribute;

/// Writes an astring: a bare atom when possible, otherwise a quoted string.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if !s.is_empty() && !s.bytes().any(needs_quoting) {
        buf.extend_from_slice(s.as_bytes());
        return;
    }

    buf.push(b'"');
    for b in s.bytes() {
        if matches!(b, b'"' | b'\\') {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

/// Writes a mailbox name.
pub fn write_mailbox(buf: &mut Vec<u8>, mailbox: &Mailbox) {
    write_astring(buf, mailbox.as_str());
}

/// Bytes that cannot appear in an atom.
const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b >= 0x7F
}

/// Writes the FETCH item list, parenthesized when there is more than one.
pub fn write_fetch_attributes(buf: &mut Vec<u8>, attrs: &[FetchAttribute]) {
    let [single] = attrs else {
        buf.push(b'(');
        for (i, attr) in attrs.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            write_fetch_attribute(buf, attr);
        }
        buf.push(b')');
        return;
    };
    write_fetch_attribute(buf, single);
}

fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
        FetchAttribute::Body { section, peek } => {
            let open: &[u8] = if *peek { b"BODY.PEEK[" } else { b"BODY[" };
            buf.extend_from_slice(open);
            if let Some(section) = section {
                buf.extend_from_slice(section.as_bytes());
            }
            buf.push(b']');
        }
    }
}
