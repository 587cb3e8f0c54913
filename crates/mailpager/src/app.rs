//! UI state and key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use mailpager_core::{Applied, MessageList, SyncCommand, SyncEvent};
use ratatui::widgets::ListState;

/// Lines moved by `PageUp`/`PageDown` in the preview.
const PAGE_SCROLL: u16 = 10;

/// Which pane receives movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The message list.
    List,
    /// The preview pane.
    Preview,
}

/// A list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Message at this index of the [`MessageList`].
    Message(usize),
    /// The `Fetch more` row.
    FetchMore,
    /// The `Quit` row.
    Quit,
}

/// What the main loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Redraw only.
    None,
    /// Hand a command to the sync thread.
    Send(SyncCommand),
    /// Leave right away.
    Quit,
}

/// Everything the terminal shows.
#[derive(Debug)]
pub struct App {
    /// Messages as reported by the sync thread.
    pub messages: MessageList,
    /// Selected row, including the two fixed rows at the end.
    pub selected: usize,
    /// Pane with keyboard focus.
    pub focus: Focus,
    /// First visible preview line.
    pub scroll: u16,
    /// Last thing that happened, for the status bar.
    pub status: String,
    /// Scroll state of the list widget.
    pub list_state: ListState,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Empty list with the `Fetch more` row selected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: MessageList::new(),
            selected: 0,
            focus: Focus::List,
            scroll: 0,
            status: "Loading...".to_string(),
            list_state: ListState::default(),
        }
    }

    /// Number of rows: messages plus `Fetch more` and `Quit`.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.messages.len() + 2
    }

    /// What the row at `index` is.
    #[must_use]
    pub fn entry(&self, index: usize) -> Entry {
        let len = self.messages.len();
        if index < len {
            Entry::Message(index)
        } else if index == len {
            Entry::FetchMore
        } else {
            Entry::Quit
        }
    }

    /// Text of the preview pane.
    #[must_use]
    pub fn preview(&self) -> &str {
        match self.entry(self.selected) {
            Entry::Message(index) => self.messages.selection_changed(index).unwrap_or_default(),
            Entry::FetchMore if self.messages.is_exhausted() => "All messages are loaded.",
            Entry::FetchMore => "Press Enter or f to load older messages.",
            Entry::Quit => "Press Enter to quit.",
        }
    }

    /// Applies a sync event. Returns the failure message when
    /// synchronization stopped.
    pub fn apply(&mut self, event: SyncEvent) -> Option<String> {
        match self.messages.apply(event) {
            Applied::InsertedAtStart => {
                // Keep the same row selected.
                self.selected += 1;
                self.status = "New mail".to_string();
            }
            Applied::InsertedAtEnd => {
                self.status = format!("Loaded {} messages", self.messages.len());
            }
            Applied::Exhausted => self.status = "No more messages".to_string(),
            Applied::Failed(message) => return Some(message),
        }
        None
    }

    /// Handles one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.status = "Checking for new mail...".to_string();
                Action::Send(SyncCommand::Refresh)
            }
            KeyCode::Char('f') => self.load_more(),
            KeyCode::Enter => match self.entry(self.selected) {
                Entry::FetchMore => self.load_more(),
                Entry::Quit => Action::Quit,
                Entry::Message(_) => {
                    self.focus = Focus::Preview;
                    Action::None
                }
            },
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::List => Focus::Preview,
                    Focus::Preview => Focus::List,
                };
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_down(1);
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_up(1);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(PAGE_SCROLL);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE_SCROLL);
                Action::None
            }
            KeyCode::Char('g') => {
                self.select(0);
                Action::None
            }
            KeyCode::Char('G') => {
                self.select(self.row_count() - 1);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn load_more(&mut self) -> Action {
        if self.messages.is_exhausted() {
            self.status = "No more messages".to_string();
            return Action::None;
        }
        self.status = "Fetching older messages...".to_string();
        Action::Send(SyncCommand::LoadMore)
    }

    fn move_down(&mut self, by: u16) {
        match self.focus {
            Focus::List => self.select(self.selected + usize::from(by)),
            Focus::Preview => self.scroll = self.scroll.saturating_add(by),
        }
    }

    fn move_up(&mut self, by: u16) {
        match self.focus {
            Focus::List => self.select(self.selected.saturating_sub(usize::from(by))),
            Focus::Preview => self.scroll = self.scroll.saturating_sub(by),
        }
    }

    fn select(&mut self, index: usize) {
        let index = index.min(self.row_count() - 1);
        if index != self.selected {
            self.selected = index;
            self.scroll = 0;
        }
    }
}
