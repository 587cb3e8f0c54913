//! End-to-end client tests against a scripted in-memory server.

#![allow(clippy::unwrap_used)]

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use proptest::prelude::*;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use mailpager_imap::{
    Client, Error, FetchAttribute, FetchItem, Response, ResponseParser, SequenceSet,
    UntaggedResponse,
};

/// Replays canned server output and records what the client sends.
struct MockStream {
    responses: Cursor<Vec<u8>>,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    fn new(responses: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            responses: Cursor::new(responses.to_vec()),
            sent: Arc::clone(&sent),
        };
        (stream, sent)
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let pos = usize::try_from(self.responses.position()).unwrap();
        let data = self.responses.get_ref();
        let remaining = &data[pos.min(data.len())..];
        let n = remaining.len().min(buf.remaining());
        buf.put_slice(&remaining[..n]);
        self.responses.set_position((pos + n) as u64);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.sent.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

fn message(subject: &str) -> String {
    format!("From: a@example.com\r\nSubject: {subject}\r\n\r\nbody\r\n")
}

fn fetch_line(seq: u32, body: &str) -> String {
    format!("* {seq} FETCH (BODY[] {{{}}}\r\n{body})\r\n", body.len())
}

#[tokio::test]
async fn full_browsing_session() {
    let mut script = String::new();
    script.push_str("* OK [CAPABILITY IMAP4rev1 LITERAL+] Dovecot ready.\r\n");
    script.push_str("A0000 OK Logged in\r\n");
    script.push_str("* LIST (\\HasNoChildren) \".\" INBOX\r\n");
    script.push_str("A0001 OK List completed\r\n");
    script.push_str("* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n");
    script.push_str("* 3 EXISTS\r\n* 0 RECENT\r\n");
    script.push_str("A0002 OK [READ-WRITE] Select completed\r\n");
    script.push_str(&fetch_line(2, &message("second")));
    script.push_str(&fetch_line(3, &message("third")));
    script.push_str("A0003 OK Fetch completed\r\n");
    script.push_str("* 4 EXISTS\r\n* 1 RECENT\r\n");
    script.push_str("A0004 OK [READ-WRITE] Select completed\r\n");
    script.push_str("* BYE Logging out\r\nA0005 OK Logout completed\r\n");

    let (stream, sent) = MockStream::new(script.as_bytes());
    let client = Client::from_stream(stream).await.unwrap();
    let mut client = client.login("me@example.com", "p4ss word").await.unwrap();
    let names = client.list("", "*").await.unwrap();
    assert_eq!(names.len(), 1);

    let mut client = client.select("INBOX").await.unwrap();
    assert_eq!(client.status().exists, 3);

    let set = SequenceSet::range(2, 3).unwrap();
    let fetched = client
        .fetch(&set, vec![FetchAttribute::full_message()])
        .await
        .unwrap();
    let seqs: Vec<u32> = fetched.iter().map(|(seq, _)| seq.get()).collect();
    assert_eq!(seqs, vec![2, 3]);
    let FetchItem::Body { data: Some(body), .. } = &fetched[1].1[0] else {
        panic!("expected body");
    };
    assert_eq!(body, message("third").as_bytes());

    assert_eq!(client.reselect().await.unwrap().exists, 4);
    client.logout().await.unwrap();

    let sent = String::from_utf8(sent.lock().unwrap().clone()).unwrap();
    assert_eq!(
        sent,
        "A0000 LOGIN me@example.com \"p4ss word\"\r\n\
         A0001 LIST \"\" \"*\"\r\n\
         A0002 SELECT INBOX\r\n\
         A0003 FETCH 2:3 BODY.PEEK[]\r\n\
         A0004 SELECT INBOX\r\n\
         A0005 LOGOUT\r\n"
    );
}

#[tokio::test]
async fn connection_dropped_mid_fetch() {
    let script = b"* OK ready\r\n\
        A0000 OK Logged in\r\n\
        * 5 EXISTS\r\n\
        A0001 OK Select completed\r\n\
        * 5 FETCH (BODY[] {100}\r\ntruncated";
    let (stream, _) = MockStream::new(script);
    let mut client = Client::from_stream(stream)
        .await
        .unwrap()
        .login("u", "p")
        .await
        .unwrap()
        .select("INBOX")
        .await
        .unwrap();
    let err = client
        .fetch(&SequenceSet::single(5).unwrap(), vec![FetchAttribute::full_message()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn server_shutdown_during_command() {
    let script = b"* OK ready\r\n* BYE System shutting down\r\n";
    let (stream, _) = MockStream::new(script);
    let client = Client::from_stream(stream).await.unwrap();
    let err = client.login("u", "p").await.unwrap_err();
    assert!(matches!(err, Error::Bye(text) if text == "System shutting down"));
}

#[test]
fn parser_handles_gmail_style_fetch() {
    let response = b"* 1 FETCH (X-GM-THRID 1278455344230334865 UID 10 BODY[] {4}\r\nabcd)\r\n";
    let Response::Untagged(UntaggedResponse::Fetch { items, .. }) =
        ResponseParser::parse(response).unwrap()
    else {
        panic!("expected FETCH");
    };
    assert_eq!(items[0], FetchItem::Uid(10));
    assert!(matches!(&items[1], FetchItem::Body { data: Some(d), .. } if d == b"abcd"));
}

proptest! {
    #[test]
    fn parser_never_panics(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = ResponseParser::parse(&input);
    }

    #[test]
    fn exists_counts_round_trip(n in any::<u32>()) {
        let line = format!("* {n} EXISTS\r\n");
        prop_assert_eq!(
            ResponseParser::parse(line.as_bytes()).unwrap(),
            Response::Untagged(UntaggedResponse::Exists(n))
        );
    }
}
