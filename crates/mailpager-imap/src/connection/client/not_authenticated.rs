//! Greeting and login.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use super::Client;
use super::states::{Authenticated, NotAuthenticated};
use crate::command::{Command, TagGenerator};
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::ResponseCode;
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads the server greeting from a freshly connected stream.
    ///
    /// Capabilities sent in the greeting are kept. A BYE greeting means
    /// the server refused the connection and is returned as [`Error::Bye`].
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);
        let greeting = framed.read_response().await?;

        let capabilities = match ResponseParser::parse(&greeting)? {
            Response::Untagged(UntaggedResponse::Bye { text, .. }) => {
                return Err(Error::Bye(text));
            }
            Response::Untagged(
                UntaggedResponse::Ok { code, text } | UntaggedResponse::PreAuth { code, text },
            ) => {
                debug!(greeting = %text, "server greeting");
                match code {
                    Some(ResponseCode::Capability(caps)) => caps,
                    _ => Vec::new(),
                }
            }
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        };

        Ok(Self {
            stream: framed,
            tag_gen: TagGenerator::default(),
            capabilities,
            state: NotAuthenticated,
        })
    }

    /// Logs in with LOGIN.
    ///
    /// On failure the connection is dropped; [`Error::No`] usually means
    /// wrong credentials.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        self.run(&Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
        info!(username, "logged in");
        Ok(self.transition(Authenticated))
    }

    /// Ends the session before logging in.
    pub async fn logout(mut self) -> Result<()> {
        self.send_logout().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Capability;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn greeting_capabilities_are_kept() {
        let mock = Builder::new()
            .read(b"* OK [CAPABILITY IMAP4rev1 AUTH=PLAIN] ready\r\n")
            .build();
        let client = Client::from_stream(mock).await.unwrap();
        assert!(client.has_capability(&Capability::Imap4Rev1));
        assert!(client.has_capability(&Capability::Auth("PLAIN".to_string())));
    }

    #[tokio::test]
    async fn bye_greeting_is_an_error() {
        let mock = Builder::new().read(b"* BYE too many connections\r\n").build();
        let err = Client::from_stream(mock).await.unwrap_err();
        assert!(matches!(err, Error::Bye(text) if text == "too many connections"));
    }

    #[tokio::test]
    async fn login_success_updates_capabilities() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN alice secret\r\n")
            .read(b"A0000 OK [CAPABILITY IMAP4rev1 IDLE] Logged in\r\n")
            .build();
        let client = Client::from_stream(mock).await.unwrap();
        let client = client.login("alice", "secret").await.unwrap();
        assert!(client.has_capability(&Capability::Idle));
    }

    #[tokio::test]
    async fn login_rejected() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0000 LOGIN alice wrong\r\n")
            .read(b"A0000 NO [AUTHENTICATIONFAILED] Authentication failed.\r\n")
            .build();
        let client = Client::from_stream(mock).await.unwrap();
        let err = client.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::No(text) if text == "Authentication failed."));
    }
}
