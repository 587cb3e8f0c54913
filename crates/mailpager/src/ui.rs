//! Rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, List, ListItem, Paragraph, Wrap};

use crate::app::{App, Focus};

const FOCUSED: Style = Style::new().fg(Color::Cyan);
const UNFOCUSED: Style = Style::new().fg(Color::DarkGray);

/// Draws the message list, the preview and the status bar.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let [main, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [list_area, preview_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(main);

    let fetch_more = if app.messages.is_exhausted() {
        "No more messages"
    } else {
        "Fetch more"
    };
    let items: Vec<ListItem> = app
        .messages
        .summaries()
        .map(ListItem::new)
        .chain([
            ListItem::new(Line::from(fetch_more).style(Style::new().add_modifier(Modifier::ITALIC))),
            ListItem::new(Line::from("Quit").style(Style::new().add_modifier(Modifier::ITALIC))),
        ])
        .collect();

    let list = List::new(items)
        .block(
            Block::bordered()
                .title(" Messages ")
                .border_style(border(app.focus == Focus::List)),
        )
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    app.list_state.select(Some(app.selected));
    frame.render_stateful_widget(list, list_area, &mut app.list_state);

    let preview = Paragraph::new(app.preview().to_string())
        .block(
            Block::bordered()
                .title(" Preview ")
                .border_style(border(app.focus == Focus::Preview)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    frame.render_widget(preview, preview_area);

    let line = format!(
        " {} messages | {} | f: more  Ctrl-R: refresh  Tab: focus  q: quit",
        app.messages.len(),
        app.status
    );
    frame.render_widget(
        Paragraph::new(line).style(Style::new().add_modifier(Modifier::REVERSED)),
        status,
    );
}

const fn border(focused: bool) -> Style {
    if focused { FOCUSED } else { UNFOCUSED }
}
