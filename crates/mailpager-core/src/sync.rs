//! The synchronization loop.
//!
//! [`SyncController`] owns the mail session and the [`MailboxStore`]. It
//! handles one [`SyncCommand`] at a time and reports every change to the
//! store as a [`SyncEvent`], so the UI never reads the store directly.
//!
//! Fetch ranges are inclusive sequence ranges computed from the store:
//!
//! ```text
//! initial load   max(N - page + 1, 1) ..= N                    N = mailbox size
//! load more      max(to - page + 1, 1) ..= to                  to = known - count
//! refresh        known + 1 ..= M                               M = new size
//! ```
//!
//! The oldest message is reached once a page starts at 1.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::decode::Decoder;
use crate::error::SyncError;
use crate::source::{MailSource, RawMessage};
use crate::store::{MailboxStore, Message, Position};
use crate::view::MessageView;

/// Requests from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// Load the next page of older messages.
    LoadMore,
    /// Check for new mail.
    Refresh,
    /// Stop the loop.
    Quit,
}

/// Instructions to the UI, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Show a newly arrived message above all others.
    InsertAtStart(MessageView),
    /// Show an older message below all others.
    InsertAtEnd(MessageView),
    /// The oldest message is loaded; further pages are empty.
    Exhausted,
    /// Synchronization stopped for good.
    Failed(String),
}

/// Drives a [`MailSource`] and keeps the [`MailboxStore`] in step.
#[derive(Debug)]
pub struct SyncController<S, D> {
    source: S,
    decoder: D,
    store: MailboxStore,
    page_size: u32,
    timeout: Duration,
    exhausted: bool,
}

impl<S: MailSource, D: Decoder> SyncController<S, D> {
    /// Creates a controller with the page size and timeout of `config`.
    #[must_use]
    pub fn new(source: S, decoder: D, config: &Config) -> Self {
        Self::with_limits(source, decoder, config.page_size, config.timeout)
    }

    /// Creates a controller with explicit limits. `page_size` is raised to 1
    /// if zero.
    #[must_use]
    pub fn with_limits(source: S, decoder: D, page_size: u32, timeout: Duration) -> Self {
        Self {
            source,
            decoder,
            store: MailboxStore::new(),
            page_size: page_size.max(1),
            timeout,
            exhausted: false,
        }
    }

    /// The loaded messages.
    #[must_use]
    pub const fn store(&self) -> &MailboxStore {
        &self.store
    }

    /// Returns true once the oldest message has been loaded.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Selects the mailbox and loads the newest page.
    ///
    /// # Errors
    ///
    /// Any select, fetch, decode or timeout failure.
    pub async fn initial_load(&mut self) -> Result<Vec<SyncEvent>, SyncError> {
        let size = self.select().await?;
        self.store.set_known_mailbox_size(size);
        info!(messages = size, "mailbox opened");
        self.load_page(i64::from(size)).await
    }

    /// Loads the page of messages just older than the oldest loaded one.
    ///
    /// Does nothing once the mailbox is exhausted.
    ///
    /// # Errors
    ///
    /// Any fetch, decode or timeout failure.
    pub async fn load_more(&mut self) -> Result<Vec<SyncEvent>, SyncError> {
        if self.exhausted {
            debug!("load more after exhaustion ignored");
            return Ok(Vec::new());
        }
        let to = i64::from(self.store.known_mailbox_size()) - i64::from(self.store.count());
        self.load_page(to).await
    }

    /// Re-selects the mailbox and loads messages that arrived since the last
    /// select.
    ///
    /// # Errors
    ///
    /// Any select, fetch, decode or timeout failure.
    pub async fn refresh(&mut self) -> Result<Vec<SyncEvent>, SyncError> {
        let known = self.store.known_mailbox_size();
        let size = self.select().await?;

        if size == known {
            debug!(messages = size, "no new mail");
            return Ok(Vec::new());
        }
        if size < known {
            warn!(
                from = known,
                to = size,
                "mailbox shrank, loaded messages may be renumbered"
            );
            self.store.set_known_mailbox_size(size);
            return Ok(Vec::new());
        }

        let messages = self.fetch(known + 1, size).await?;
        let mut events = Vec::with_capacity(messages.len());
        for message in messages {
            if self.store.contains(message.id) {
                warn!(seq = message.id, "duplicate skipped at refresh");
                continue;
            }
            let view = MessageView::new(&message);
            if self.store.insert(message, Position::Start) {
                events.push(SyncEvent::InsertAtStart(view));
            }
        }
        self.store.set_known_mailbox_size(size);
        info!(new = events.len(), messages = size, "refreshed");
        Ok(events)
    }

    /// Runs the initial load, then serves `commands` until [`SyncCommand::Quit`],
    /// the end of the queue, or the first failure.
    ///
    /// A failure is reported as [`SyncEvent::Failed`] before it is returned.
    /// The loop also ends quietly when the UI drops its receiver.
    ///
    /// # Errors
    ///
    /// The failure that stopped the loop.
    pub async fn run(
        mut self,
        mut commands: UnboundedReceiver<SyncCommand>,
        events: UnboundedSender<SyncEvent>,
    ) -> Result<(), SyncError> {
        let mut result = self.initial_load().await;
        loop {
            match result {
                Ok(batch) => {
                    for event in batch {
                        if events.send(event).is_err() {
                            debug!("event receiver gone, stopping");
                            return Ok(());
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "synchronization failed");
                    let _ = events.send(SyncEvent::Failed(err.to_string()));
                    return Err(err);
                }
            }

            result = match commands.recv().await {
                Some(SyncCommand::LoadMore) => self.load_more().await,
                Some(SyncCommand::Refresh) => self.refresh().await,
                Some(SyncCommand::Quit) | None => {
                    debug!("synchronization loop finished");
                    return Ok(());
                }
            };
        }
    }

    /// Fetches the page ending at `to` and appends it newest-first.
    async fn load_page(&mut self, to: i64) -> Result<Vec<SyncEvent>, SyncError> {
        let Some(last) = u32::try_from(to).ok().filter(|&n| n > 0) else {
            return Ok(self.exhaust());
        };
        let first = page_start(last, self.page_size);

        let messages = self.fetch(first, last).await?;
        let mut events = Vec::with_capacity(messages.len() + 1);
        for message in messages.into_iter().rev() {
            if self.store.contains(message.id) {
                debug!(seq = message.id, "already loaded");
                continue;
            }
            let view = MessageView::new(&message);
            if self.store.insert(message, Position::End) {
                events.push(SyncEvent::InsertAtEnd(view));
            }
        }
        info!(first, last, loaded = self.store.count(), "page loaded");

        if first == 1 {
            events.extend(self.exhaust());
        }
        Ok(events)
    }

    fn exhaust(&mut self) -> Vec<SyncEvent> {
        if self.exhausted {
            return Vec::new();
        }
        self.exhausted = true;
        info!("reached the oldest message");
        vec![SyncEvent::Exhausted]
    }

    async fn select(&mut self) -> Result<u32, SyncError> {
        let info = with_timeout(self.timeout, "select", self.source.select())
            .await?
            .map_err(SyncError::Select)?;
        Ok(info.message_count)
    }

    /// Fetches and decodes `first..=last`, ascending. Nothing is returned
    /// unless every sequence number of the range has a record and every
    /// record decodes.
    async fn fetch(&mut self, first: u32, last: u32) -> Result<Vec<Message>, SyncError> {
        debug!(first, last, "fetch range");
        let range = format!("{first}:{last}");
        let mut records: Vec<RawMessage> =
            with_timeout(self.timeout, "fetch", self.source.fetch_range(first, last))
                .await?
                .map_err(|source| SyncError::Fetch {
                    range: range.clone(),
                    source,
                })?;

        let returned: HashSet<u32> = records.iter().map(|r| r.seq).collect();
        if let Some(missing) = (first..=last).find(|seq| !returned.contains(seq)) {
            return Err(SyncError::Incomplete { range, missing });
        }
        records.retain(|r| {
            let wanted = (first..=last).contains(&r.seq);
            if !wanted {
                warn!(seq = r.seq, %range, "record outside the fetched range skipped");
            }
            wanted
        });

        let mut messages = records
            .iter()
            .map(|raw| {
                self.decoder
                    .decode(raw)
                    .map_err(|source| SyncError::Decode {
                        seq: raw.seq,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }
}

/// First sequence number of the page ending at `last`.
const fn page_start(last: u32, page_size: u32) -> u32 {
    let first = last.saturating_sub(page_size.saturating_sub(1));
    if first == 0 {
        1
    } else {
        first
    }
}

async fn with_timeout<T>(
    after: Duration,
    operation: &'static str,
    future: impl Future<Output = T>,
) -> Result<T, SyncError> {
    tokio::time::timeout(after, future)
        .await
        .map_err(|_| SyncError::Timeout { operation, after })
}
