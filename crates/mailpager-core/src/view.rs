//! What the terminal shows for each message.

use std::collections::VecDeque;
use std::fmt::Write as _;

use crate::store::Message;
use crate::sync::SyncEvent;

const NO_TEXT: &str = "(no text content)";

/// Display fields of one list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// Sequence number.
    pub id: u32,
    /// One-line list entry: `id. [sender] subject (date)`.
    pub summary: String,
    /// Text for the preview pane.
    pub preview: String,
}

impl MessageView {
    /// Builds the display fields of `message`.
    #[must_use]
    pub fn new(message: &Message) -> Self {
        let mail = &message.mail;
        let sender = mail.sender().map_or("", |a| a.email.as_str());
        let summary = format!(
            "{}. [{sender}] {} ({})",
            message.id,
            mail.subject,
            mail.date.format("%Y-%m-%d %H:%M:%S %z")
        );

        Self {
            id: message.id,
            summary,
            preview: preview(message),
        }
    }
}

fn preview(message: &Message) -> String {
    let mail = &message.mail;
    let body = |content_type: &str| mail.body(content_type).filter(|b| !b.trim().is_empty());
    let mut text = body("text/plain").map_or_else(
        || {
            body("text/html").map_or_else(
                || NO_TEXT.to_string(),
                |html| htmd::convert(html).unwrap_or_else(|_| html.to_string()),
            )
        },
        str::to_string,
    );

    if !mail.attachments.is_empty() {
        let mut names: Vec<_> = mail.attachments.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        text.push_str("\n\nAttachments:\n");
        for (name, data) in names {
            let _ = writeln!(text, "  {name} ({} bytes)", data.len());
        }
    }
    text
}

/// What [`MessageList::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// An entry was added at index 0.
    InsertedAtStart,
    /// An entry was added after the last one.
    InsertedAtEnd,
    /// There are no older messages.
    Exhausted,
    /// Synchronization stopped with this message.
    Failed(String),
}

/// The list as the UI sees it, built only from [`SyncEvent`]s.
#[derive(Debug, Default)]
pub struct MessageList {
    entries: VecDeque<MessageView>,
    exhausted: bool,
}

impl MessageList {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event in arrival order.
    pub fn apply(&mut self, event: SyncEvent) -> Applied {
        match event {
            SyncEvent::InsertAtStart(view) => {
                self.entries.push_front(view);
                Applied::InsertedAtStart
            }
            SyncEvent::InsertAtEnd(view) => {
                self.entries.push_back(view);
                Applied::InsertedAtEnd
            }
            SyncEvent::Exhausted => {
                self.exhausted = true;
                Applied::Exhausted
            }
            SyncEvent::Failed(message) => Applied::Failed(message),
        }
    }

    /// Preview text of the entry at `index`.
    #[must_use]
    pub fn selection_changed(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|v| v.preview.as_str())
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MessageView> {
        self.entries.get(index)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summaries in presentation order.
    pub fn summaries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|v| v.summary.as_str())
    }

    /// Returns true once the oldest message has been loaded.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
