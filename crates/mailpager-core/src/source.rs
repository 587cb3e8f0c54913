//! Where messages come from.

use std::future::Future;

/// One record of a range fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Sequence number.
    pub seq: u32,
    /// The full message, `None` when the server sent no `BODY[]` section.
    pub body: Option<Vec<u8>>,
}

/// Result of selecting the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxInfo {
    /// Number of messages in the mailbox right now.
    pub message_count: u32,
}

/// An authenticated session on one mailbox.
///
/// Calling [`select`](MailSource::select) again re-reads the mailbox size;
/// that is how new mail is detected.
pub trait MailSource {
    /// Selects the mailbox, or re-selects it.
    fn select(
        &mut self,
    ) -> impl Future<Output = mailpager_imap::Result<MailboxInfo>> + Send;

    /// Fetches messages `first..=last` in ascending order.
    ///
    /// Callers guarantee `1 <= first <= last`.
    fn fetch_range(
        &mut self,
        first: u32,
        last: u32,
    ) -> impl Future<Output = mailpager_imap::Result<Vec<RawMessage>>> + Send;
}
