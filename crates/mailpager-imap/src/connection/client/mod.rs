//! Type-state client.
//!
//! A connection moves through `NotAuthenticated` → `Authenticated` →
//! `Selected`. Each state only exposes the commands valid in it, and a
//! transition consumes the client so a stale state cannot be reused.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::{FramedStream, ResponseAccumulator};
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::{Capability, ResponseCode, Status};
use crate::{Error, Result};

/// IMAP client over stream `S` in session state `State`.
pub struct Client<S, State> {
    pub(crate) stream: FramedStream<S>,
    pub(crate) tag_gen: TagGenerator,
    pub(crate) capabilities: Vec<Capability>,
    pub(crate) state: State,
}

impl<S, State: std::fmt::Debug> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("capabilities", &self.capabilities)
            .field("tags_issued", &self.tag_gen.issued())
            .finish_non_exhaustive()
    }
}

/// Untagged data and completion code of one successful command.
pub(crate) struct Reply {
    pub(crate) data: Vec<UntaggedResponse>,
    pub(crate) code: Option<ResponseCode>,
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Capabilities from the greeting or the latest CAPABILITY data.
    #[must_use]
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns true if the server advertised `cap`.
    #[must_use]
    pub fn has_capability(&self, cap: &Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Sends `command` and waits for its completion.
    ///
    /// Untagged responses the parser does not understand are logged and
    /// dropped. A NO, BAD or BYE completion becomes the matching error.
    pub(crate) async fn run(&mut self, command: &Command) -> Result<Reply> {
        let tag = self.tag_gen.next();
        debug!(tag = %tag, command = command.name(), "sending command");
        self.stream.write_command(&command.serialize(&tag)).await?;

        let raw = ResponseAccumulator::new(tag.as_str())
            .read_until_tagged(&mut self.stream)
            .await?;

        let mut data = Vec::with_capacity(raw.len());
        let mut completion = None;
        for bytes in &raw {
            match ResponseParser::parse(bytes) {
                Ok(Response::Untagged(UntaggedResponse::Capability(caps))) => {
                    self.capabilities = caps;
                }
                Ok(Response::Untagged(untagged)) => data.push(untagged),
                Ok(Response::Tagged {
                    tag: t,
                    status,
                    code,
                    text,
                }) if t.as_str() == tag => completion = Some((status, code, text)),
                Ok(other) => debug!(?other, "ignoring response"),
                Err(e) => warn!(error = %e, "unparseable response skipped"),
            }
        }

        let Some((status, code, text)) = completion else {
            return Err(Error::Protocol(format!("no parseable completion for {tag}")));
        };
        debug!(tag = %tag, ?status, "command completed");

        match status {
            Status::Ok | Status::PreAuth => {
                if let Some(ResponseCode::Capability(caps)) = &code {
                    self.capabilities.clone_from(caps);
                }
                Ok(Reply { data, code })
            }
            Status::No => Err(Error::No(text)),
            Status::Bad => Err(Error::Bad(text)),
            Status::Bye => Err(Error::Bye(text)),
        }
    }

    /// Sends LOGOUT, treating the server's BYE as success.
    pub(crate) async fn send_logout(&mut self) -> Result<()> {
        match self.run(&Command::Logout).await {
            Ok(_) | Err(Error::Bye(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Moves the connection into another state.
    pub(crate) fn transition<T>(self, state: T) -> Client<S, T> {
        Client {
            stream: self.stream,
            tag_gen: self.tag_gen,
            capabilities: self.capabilities,
            state,
        }
    }
}
