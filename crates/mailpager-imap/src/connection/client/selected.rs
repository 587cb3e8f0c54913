//! Commands available with a mailbox selected.

use std::collections::BTreeMap;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::Client;
use super::authenticated::select_status;
use super::states::Selected;
use crate::Result;
use crate::command::{Command, FetchAttribute};
use crate::parser::{FetchItem, UntaggedResponse};
use crate::types::{Mailbox, MailboxStatus, SeqNum, SequenceSet};

impl<S> Client<S, Selected>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Name of the selected mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        self.state.mailbox()
    }

    /// Status recorded by the last SELECT.
    #[must_use]
    pub const fn status(&self) -> MailboxStatus {
        self.state.status()
    }

    /// Issues SELECT again for the same mailbox and returns its current status.
    ///
    /// This is how new mail is noticed without IDLE: the EXISTS count in
    /// the reply is the mailbox size right now.
    pub async fn reselect(&mut self) -> Result<MailboxStatus> {
        let mailbox = self.state.mailbox.clone();
        let status = select_status(self.run(&Command::Select { mailbox }).await?);
        debug!(exists = status.exists, "mailbox re-selected");
        self.state.status = status;
        Ok(status)
    }

    /// Fetches `items` for every message in `sequence`.
    ///
    /// Results are ordered by ascending sequence number. Several FETCH
    /// responses for one message are merged.
    pub async fn fetch(
        &mut self,
        sequence: &SequenceSet,
        items: Vec<FetchAttribute>,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        let reply = self
            .run(&Command::Fetch {
                sequence: sequence.clone(),
                items,
            })
            .await?;

        let mut messages: BTreeMap<SeqNum, Vec<FetchItem>> = BTreeMap::new();
        for response in reply.data {
            match response {
                UntaggedResponse::Fetch { seq, items } => {
                    messages.entry(seq).or_default().extend(items);
                }
                UntaggedResponse::Exists(n) => {
                    debug!(exists = n, "mailbox size changed during FETCH");
                }
                _ => {}
            }
        }
        Ok(messages.into_iter().collect())
    }

    /// Ends the session.
    pub async fn logout(mut self) -> Result<()> {
        self.send_logout().await
    }
}
