//! In-memory mailbox contents.

use std::collections::{HashSet, VecDeque};

/// A decoded message and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sequence number in the selected mailbox. Only stable until the
    /// mailbox is expunged.
    pub id: u32,
    /// Decoded content.
    pub mail: mailpager_mime::Message,
}

/// Which end of the list an insert goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Newest end, used for mail found by a refresh.
    Start,
    /// Oldest end, used for paging backwards.
    End,
}

/// Loaded messages in presentation order, newest first.
///
/// Each sequence number is held at most once.
#[derive(Debug, Default)]
pub struct MailboxStore {
    messages: VecDeque<Message>,
    ids: HashSet<u32>,
    known_mailbox_size: u32,
}

impl MailboxStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a message with this id is held.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Inserts `message` at `position`.
    ///
    /// Returns false, leaving the store unchanged, when a message with the
    /// same id is already held.
    pub fn insert(&mut self, message: Message, position: Position) -> bool {
        if !self.ids.insert(message.id) {
            return false;
        }
        match position {
            Position::Start => self.messages.push_front(message),
            Position::End => self.messages.push_back(message),
        }
        true
    }

    /// Number of held messages.
    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.messages.len()).unwrap_or(u32::MAX)
    }

    /// Mailbox size seen at the last select.
    #[must_use]
    pub const fn known_mailbox_size(&self) -> u32 {
        self.known_mailbox_size
    }

    /// Records the mailbox size seen at a select.
    pub const fn set_known_mailbox_size(&mut self, size: u32) {
        self.known_mailbox_size = size;
    }

    /// Message at `index` in presentation order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Ids in presentation order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        self.messages.iter().map(|m| m.id).collect()
    }
}
