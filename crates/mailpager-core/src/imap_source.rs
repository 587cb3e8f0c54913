//! [`MailSource`] over a live IMAP session.

use std::mem;

use mailpager_imap::connection::connect;
use mailpager_imap::{
    Authenticated, Client, Error, FetchAttribute, FetchItem, ImapStream, NotAuthenticated,
    Security, Selected, SequenceSet,
};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::SyncError;
use crate::source::{MailSource, MailboxInfo, RawMessage};

/// Authenticated client before SELECT.
pub type AuthClient = Client<ImapStream, Authenticated>;

/// Client with the mailbox selected.
pub type SelectedClient = Client<ImapStream, Selected>;

enum Session {
    Authenticated(AuthClient),
    Selected(SelectedClient),
    /// A failed SELECT consumed the client.
    Closed,
}

/// Reads one mailbox of an IMAP account.
pub struct ImapSource {
    session: Session,
    mailbox: String,
}

impl std::fmt::Debug for ImapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.session {
            Session::Authenticated(_) => "authenticated",
            Session::Selected(_) => "selected",
            Session::Closed => "closed",
        };
        f.debug_struct("ImapSource")
            .field("mailbox", &self.mailbox)
            .field("state", &state)
            .finish()
    }
}

impl ImapSource {
    /// Connects, logs in and lists the account's mailboxes.
    ///
    /// The whole exchange is bounded by `config.timeout`.
    ///
    /// # Errors
    ///
    /// [`SyncError::Connection`], [`SyncError::Authentication`],
    /// [`SyncError::List`] or [`SyncError::Timeout`].
    pub async fn connect(config: &Config) -> Result<Self, SyncError> {
        let after = config.timeout;
        tokio::time::timeout(after, Self::open(config))
            .await
            .map_err(|_| SyncError::Timeout {
                operation: "connect",
                after,
            })?
    }

    async fn open(config: &Config) -> Result<Self, SyncError> {
        let server = format!("{}:{}", config.server.host, config.server.port);
        let connection_error = |source| SyncError::Connection {
            server: server.clone(),
            source,
        };

        let stream = connect(&config.server).await.map_err(connection_error)?;
        let client = Client::<_, NotAuthenticated>::from_stream(stream)
            .await
            .map_err(connection_error)?;
        let tls = config.server.security == Security::Implicit;
        info!(%server, tls, "connected");

        let mut client = client
            .login(&config.username, &config.password)
            .await
            .map_err(SyncError::Authentication)?;

        let mailboxes = client.list("", "*").await.map_err(SyncError::List)?;
        info!(count = mailboxes.len(), "mailboxes listed");
        for entry in &mailboxes {
            debug!(
                mailbox = entry.mailbox.as_str(),
                selectable = entry.is_selectable(),
                "mailbox"
            );
        }

        Ok(Self::from_client(client, &config.mailbox))
    }

    /// Wraps an already authenticated client.
    #[must_use]
    pub fn from_client(client: AuthClient, mailbox: &str) -> Self {
        Self {
            session: Session::Authenticated(client),
            mailbox: mailbox.to_string(),
        }
    }
}

impl MailSource for ImapSource {
    async fn select(&mut self) -> mailpager_imap::Result<MailboxInfo> {
        let status = match mem::replace(&mut self.session, Session::Closed) {
            Session::Authenticated(client) => {
                let client = client.select(&self.mailbox).await?;
                let status = client.status();
                self.session = Session::Selected(client);
                status
            }
            Session::Selected(mut client) => {
                let status = client.reselect().await;
                self.session = Session::Selected(client);
                status?
            }
            Session::Closed => return Err(closed()),
        };
        info!(mailbox = %self.mailbox, exists = status.exists, "mailbox selected");
        Ok(MailboxInfo {
            message_count: status.exists,
        })
    }

    async fn fetch_range(
        &mut self,
        first: u32,
        last: u32,
    ) -> mailpager_imap::Result<Vec<RawMessage>> {
        let Session::Selected(client) = &mut self.session else {
            return Err(closed());
        };
        let sequence = SequenceSet::range(first, last)
            .ok_or_else(|| Error::InvalidState(format!("empty range {first}:{last}")))?;
        debug!(%sequence, "fetching");

        let fetched = client
            .fetch(&sequence, vec![FetchAttribute::full_message()])
            .await?;
        let mut records: Vec<RawMessage> = fetched
            .into_iter()
            .map(|(seq, items)| RawMessage {
                seq: seq.get(),
                body: items.into_iter().find_map(|item| match item {
                    FetchItem::Body {
                        section: None,
                        data,
                        ..
                    } => data,
                    _ => None,
                }),
            })
            .collect();
        records.sort_by_key(|r| r.seq);
        Ok(records)
    }
}

fn closed() -> Error {
    Error::InvalidState("mailbox session is closed".to_string())
}
