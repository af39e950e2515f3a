use crate::app::{App, Focus};
use crate::view::{render_feed_row, FeedRow};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the menu: feed list on top, favorites below.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Favorites panel grows with its rows, up to 8 plus borders
    let favorites_height = app.favorites.len().clamp(1, 8) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(favorites_height)])
        .split(area);

    render_feeds(f, app, chunks[0]);
    render_favorites(f, app, chunks[1]);
}

fn row_item(row: &FeedRow, selected: bool, current: bool) -> ListItem<'static> {
    let style = if selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else if row.unread.is_some_and(|n| n > 0) {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let mut spans = Vec::with_capacity(4);
    spans.push(Span::raw(if current { "▸ " } else { "  " }));
    if row.favorite {
        spans.push(Span::styled("★ ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(row.name.clone(), style));
    if let Some(unread) = row.unread.filter(|&n| n > 0) {
        spans.push(Span::styled(
            format!(" ({})", unread),
            Style::default().fg(Color::DarkGray),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn panel(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_feeds(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Menu;
    let current = app.nav.current();

    let items: Vec<ListItem> = app
        .registry
        .iter()
        .enumerate()
        .map(|(i, feed)| {
            let row = render_feed_row(i, feed);
            row_item(&row, is_focused && i == app.selected_menu_row, i == current)
        })
        .collect();

    let list = List::new(items).block(panel(
        format!("Feeds ({})", app.registry.len()),
        is_focused,
    ));
    let mut state = ListState::default().with_selected(Some(app.selected_menu_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_favorites(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Favorites;
    let current = app.nav.current();

    let items: Vec<ListItem> = if app.favorites.is_empty() {
        vec![ListItem::new(Span::styled(
            "  No favorites",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.favorites
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(pos, &index)| {
                let feed = app.registry.get(index)?;
                let row = render_feed_row(index, feed);
                Some(row_item(
                    &row,
                    is_focused && pos == app.selected_favorite,
                    index == current,
                ))
            })
            .collect()
    };

    let list = List::new(items).block(panel("Favorites".to_string(), is_focused));
    let mut state = ListState::default().with_selected(Some(app.selected_favorite));
    f.render_stateful_widget(list, area, &mut state);
}
