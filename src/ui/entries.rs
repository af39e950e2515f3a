use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use crate::view::format_relative_time;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the entry list panel
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Entries;
    // Room inside the borders
    let inner_width = area.width.saturating_sub(2) as usize;

    let (title, items): (String, Vec<ListItem>) = match &app.view {
        None => ("feedcycle".to_string(), vec![ListItem::new("Loading...")]),
        Some(view) if view.is_empty() => (view.title.clone(), vec![ListItem::new("No entries")]),
        Some(view) => {
            let items = view
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let time_str = format_relative_time(entry.published);

                    let marker = if entry.is_read() {
                        Span::raw("  ")
                    } else {
                        Span::styled("● ", Style::default().fg(Color::Cyan))
                    };

                    let title_style = if is_focused && i == app.selected_entry {
                        Style::default().bg(Color::DarkGray).fg(Color::White)
                    } else if entry.is_read() {
                        Style::default().fg(Color::Gray)
                    } else {
                        Style::default().add_modifier(Modifier::BOLD)
                    };

                    // Leave room for the marker and the time column
                    let max_title = inner_width.saturating_sub(2 + time_str.len() + 2);
                    let mut header = vec![
                        marker,
                        Span::styled(
                            truncate_to_width(&entry.title, max_title).into_owned(),
                            title_style,
                        ),
                    ];
                    if !time_str.is_empty() {
                        header.push(Span::styled(
                            format!("  {}", time_str),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }

                    let mut lines = vec![Line::from(header)];
                    if !entry.preview.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!(
                                "  {}",
                                truncate_to_width(&entry.preview, inner_width.saturating_sub(2))
                            ),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }

                    ListItem::new(lines)
                })
                .collect();
            (view.title.clone(), items)
        }
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    // Keep the selection scrolled into view
    let mut state = ListState::default().with_selected(Some(app.selected_entry));
    f.render_stateful_widget(list, area, &mut state);
}
