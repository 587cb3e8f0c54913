//! Response framing.
//!
//! A server response is one CRLF-terminated line, except that a line ending
//! in `{n}` is followed by `n` raw bytes and then the rest of the response.
//! The framed stream hands out whole responses so the parser never sees a
//! partial literal.

#![allow(clippy::missing_errors_doc)]

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

const READ_CHUNK: usize = 8 * 1024;

/// Longest line accepted outside literals.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest literal accepted. Whole messages are fetched as one literal.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered connection that reads complete responses.
pub struct FramedStream<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Reads one complete response, embedded literals included.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut line_start = 0;
        let mut searched = 0;

        loop {
            if let Some(offset) = find_crlf(&self.buffer[searched..]) {
                let line_end = searched + offset + 2;
                match parse_literal_length(&self.buffer[line_start..line_end]) {
                    Some(len) if len > MAX_LITERAL_SIZE => {
                        return Err(Error::Protocol(format!(
                            "literal of {len} bytes exceeds the {MAX_LITERAL_SIZE} byte limit"
                        )));
                    }
                    Some(len) => {
                        let literal_end = line_end + len;
                        self.fill_to(literal_end).await?;
                        line_start = literal_end;
                        searched = literal_end;
                    }
                    None => return Ok(self.buffer.split_to(line_end).to_vec()),
                }
                continue;
            }

            if self.buffer.len() - line_start > MAX_LINE_LENGTH {
                return Err(Error::Protocol("response line too long".to_string()));
            }
            // A CR at the very end may pair with an LF still in flight.
            searched = self.buffer.len().saturating_sub(1).max(line_start);
            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> Result<()> {
        self.buffer.reserve(READ_CHUNK);
        if self.stream.read_buf(&mut self.buffer).await? == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }
        Ok(())
    }

    async fn fill_to(&mut self, len: usize) -> Result<()> {
        if len > self.buffer.len() {
            self.buffer.reserve(len - self.buffer.len());
        }
        while self.buffer.len() < len {
            self.fill().await?;
        }
        Ok(())
    }

    /// Writes one serialized command and flushes it.
    pub async fn write_command(&mut self, command: &[u8]) -> Result<()> {
        self.stream.write_all(command).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Returns the wrapped stream, dropping anything buffered.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Returns `n` when the line ends with `{n}\r\n` (or `{n+}\r\n`).
fn parse_literal_length(line: &[u8]) -> Option<usize> {
    let body = line.strip_suffix(b"\r\n")?.strip_suffix(b"}")?;
    let body = body.strip_suffix(b"+").unwrap_or(body);
    let open = body.iter().rposition(|&b| b == b'{')?;
    let digits = &body[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Collects responses until the completion for one tag arrives.
pub struct ResponseAccumulator {
    tag: String,
    responses: Vec<Vec<u8>>,
}

impl ResponseAccumulator {
    /// Waits for the completion of the command tagged `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            responses: Vec::new(),
        }
    }

    /// Reads until the tagged response, returning every response seen,
    /// the tagged one last.
    ///
    /// If the server hangs up after an untagged BYE the BYE text is
    /// reported as [`Error::Bye`] instead of a bare I/O error.
    pub async fn read_until_tagged<S>(
        &mut self,
        framed: &mut FramedStream<S>,
    ) -> Result<Vec<Vec<u8>>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let response = match framed.read_response().await {
                Ok(response) => response,
                Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(self.bye_text().map_or(Error::Io(e), Error::Bye));
                }
                Err(e) => return Err(e),
            };
            let done = self.is_completion(&response);
            self.responses.push(response);
            if done {
                return Ok(std::mem::take(&mut self.responses));
            }
        }
    }

    fn is_completion(&self, response: &[u8]) -> bool {
        response
            .strip_prefix(self.tag.as_bytes())
            .is_some_and(|rest| rest.first() == Some(&b' '))
    }

    fn bye_text(&self) -> Option<String> {
        self.responses.iter().find_map(|r| {
            let prefix = r.get(..6)?;
            prefix.eq_ignore_ascii_case(b"* BYE ").then(|| {
                String::from_utf8_lossy(&r[6..]).trim_end().to_string()
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[test]
    fn literal_length_suffix() {
        assert_eq!(parse_literal_length(b"* 3 FETCH (BODY[] {342}\r\n"), Some(342));
        assert_eq!(parse_literal_length(b"{0}\r\n"), Some(0));
        assert_eq!(parse_literal_length(b"A1 LOGIN {5+}\r\n"), Some(5));
        assert_eq!(parse_literal_length(b"* OK done\r\n"), None);
        assert_eq!(parse_literal_length(b"* OK {}\r\n"), None);
        assert_eq!(parse_literal_length(b"* OK {12a}\r\n"), None);
        assert_eq!(parse_literal_length(b"{12}"), None);
    }

    #[tokio::test]
    async fn reads_one_line_at_a_time() {
        let mock = Builder::new().read(b"* 40 EXISTS\r\n* 0 RECENT\r\n").build();
        let mut framed = FramedStream::new(mock);
        assert_eq!(framed.read_response().await.unwrap(), b"* 40 EXISTS\r\n");
        assert_eq!(framed.read_response().await.unwrap(), b"* 0 RECENT\r\n");
    }

    #[tokio::test]
    async fn line_split_between_cr_and_lf() {
        let mock = Builder::new().read(b"* OK ready\r").read(b"\n").build();
        let mut framed = FramedStream::new(mock);
        assert_eq!(framed.read_response().await.unwrap(), b"* OK ready\r\n");
    }

    #[tokio::test]
    async fn literal_with_crlf_inside_and_split_reads() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[] {9}\r\nab\r")
            .read(b"\ncd\r\nef)\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        assert_eq!(
            framed.read_response().await.unwrap(),
            b"* 1 FETCH (BODY[] {9}\r\nab\r\ncd\r\nef)\r\n"
        );
    }

    #[tokio::test]
    async fn two_literals_in_one_response() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[1] {1}\r\nx BODY[2] {1}\r\ny)\r\nA1 OK\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        assert_eq!(
            framed.read_response().await.unwrap(),
            b"* 1 FETCH (BODY[1] {1}\r\nx BODY[2] {1}\r\ny)\r\n"
        );
        assert_eq!(framed.read_response().await.unwrap(), b"A1 OK\r\n");
    }

    #[tokio::test]
    async fn oversized_literal_is_refused() {
        let mock = Builder::new().read(b"* 1 FETCH (BODY[] {999999999}\r\n").build();
        let mut framed = FramedStream::new(mock);
        assert!(matches!(
            framed.read_response().await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn eof_mid_line() {
        let mock = Builder::new().read(b"* OK no end").build();
        let mut framed = FramedStream::new(mock);
        assert!(matches!(framed.read_response().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn write_command_sends_bytes() {
        let mock = Builder::new().write(b"A0001 LOGOUT\r\n").build();
        let mut framed = FramedStream::new(mock);
        framed.write_command(b"A0001 LOGOUT\r\n").await.unwrap();
    }

    #[tokio::test]
    async fn accumulates_until_own_tag() {
        let mock = Builder::new()
            .read(b"* 40 EXISTS\r\n")
            .read(b"A00011 OK not ours\r\n")
            .read(b"A0001 OK done\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        let responses = ResponseAccumulator::new("A0001")
            .read_until_tagged(&mut framed)
            .await
            .unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[2], b"A0001 OK done\r\n");
    }

    #[tokio::test]
    async fn hangup_after_bye_reports_bye() {
        let mock = Builder::new()
            .read(b"* BYE server shutting down\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        let err = ResponseAccumulator::new("A0002")
            .read_until_tagged(&mut framed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Bye(text) if text == "server shutting down"));
    }
}
