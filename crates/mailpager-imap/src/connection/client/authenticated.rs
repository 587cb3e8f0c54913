//! Commands available after login.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use super::states::{Authenticated, Selected};
use super::{Client, Reply};
use crate::Result;
use crate::command::Command;
use crate::parser::UntaggedResponse;
use crate::types::{ListResponse, Mailbox, MailboxStatus, ResponseCode};

impl<S> Client<S, Authenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Lists mailbox names matching `pattern` under `reference`.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        let reply = self
            .run(&Command::List {
                reference: reference.to_string(),
                pattern: pattern.to_string(),
            })
            .await?;
        Ok(reply
            .data
            .into_iter()
            .filter_map(|r| match r {
                UntaggedResponse::List(list) => Some(list),
                _ => None,
            })
            .collect())
    }

    /// Selects `mailbox` read-write.
    pub async fn select(mut self, mailbox: &str) -> Result<Client<S, Selected>> {
        let mailbox = Mailbox::new(mailbox);
        let status = select_status(self.run(&Command::Select { mailbox: mailbox.clone() }).await?);
        info!(mailbox = %mailbox, exists = status.exists, "mailbox selected");
        Ok(self.transition(Selected { mailbox, status }))
    }

    /// Ends the session.
    pub async fn logout(mut self) -> Result<()> {
        self.send_logout().await
    }
}

/// Collects EXISTS, RECENT and the access mode from a SELECT reply.
pub(super) fn select_status(reply: Reply) -> MailboxStatus {
    let mut status = MailboxStatus {
        read_only: matches!(reply.code, Some(ResponseCode::ReadOnly)),
        ..MailboxStatus::default()
    };
    for response in reply.data {
        match response {
            UntaggedResponse::Exists(n) => status.exists = n,
            UntaggedResponse::Recent(n) => status.recent = n,
            _ => {}
        }
    }
    status
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use tokio_test::io::Builder;

    const GREETING: &[u8] = b"* OK ready\r\n";

    async fn logged_in(mock: tokio_test::io::Mock) -> Client<tokio_test::io::Mock, Authenticated> {
        let client = Client::from_stream(mock).await.unwrap();
        client.login("u", "p").await.unwrap()
    }

    #[tokio::test]
    async fn list_returns_names() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 LIST \"\" \"*\"\r\n")
            .read(b"* LIST (\\HasNoChildren) \"/\" INBOX\r\n")
            .read(b"* LIST (\\Noselect \\HasChildren) \"/\" \"[Gmail]\"\r\n")
            .read(b"A0001 OK LIST completed\r\n")
            .build();
        let mut client = logged_in(mock).await;
        let names = client.list("", "*").await.unwrap();
        assert_eq!(names.len(), 2);
        assert!(names[0].mailbox.is_inbox());
        assert!(!names[1].is_selectable());
    }

    #[tokio::test]
    async fn select_reads_status() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 SELECT INBOX\r\n")
            .read(b"* FLAGS (\\Answered \\Seen)\r\n")
            .read(b"* 40 EXISTS\r\n")
            .read(b"* 2 RECENT\r\n")
            .read(b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n")
            .read(b"A0001 OK [READ-WRITE] SELECT completed\r\n")
            .build();
        let client = logged_in(mock).await.select("INBOX").await.unwrap();
        let status = client.state.status();
        assert_eq!(status.exists, 40);
        assert_eq!(status.recent, 2);
        assert!(!status.read_only);
    }

    #[tokio::test]
    async fn select_read_only() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 SELECT Shared\r\n")
            .read(b"* 3 EXISTS\r\n")
            .read(b"A0001 OK [READ-ONLY] done\r\n")
            .build();
        let client = logged_in(mock).await.select("Shared").await.unwrap();
        assert!(client.state.status().read_only);
    }

    #[tokio::test]
    async fn select_missing_mailbox() {
        let mock = Builder::new()
            .read(GREETING)
            .write(b"A0000 LOGIN u p\r\n")
            .read(b"A0000 OK done\r\n")
            .write(b"A0001 SELECT Nope\r\n")
            .read(b"A0001 NO Mailbox doesn't exist: Nope\r\n")
            .build();
        let err = logged_in(mock).await.select("Nope").await.unwrap_err();
        assert!(matches!(err, Error::No(_)));
    }
}
