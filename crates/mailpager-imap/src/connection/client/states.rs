//! Session states.
//!
//! `NotAuthenticated` and `Authenticated` are plain markers. `Selected`
//! remembers which mailbox was selected so it can be re-selected later.

use crate::types::{Mailbox, MailboxStatus};

/// Greeting received, LOGIN not done yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Logged in, no mailbox selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// A mailbox is selected.
#[derive(Debug, Clone)]
pub struct Selected {
    pub(crate) mailbox: Mailbox,
    pub(crate) status: MailboxStatus,
}

impl Selected {
    /// Name of the selected mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Status from the most recent SELECT.
    #[must_use]
    pub const fn status(&self) -> MailboxStatus {
        self.status
    }
}
