use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const SPINNER: [char; super::loop_runner::SPINNER_FRAMES] =
    ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if let Some(feed) = app.loading.and_then(|i| app.registry.get(i)) {
        Cow::Owned(format!(
            "{} Loading {}...",
            SPINNER[app.spinner_frame % SPINNER.len()],
            feed.name
        ))
    } else if app.menu_visible {
        Cow::Borrowed("[Enter]load [f]avorite [u]nfavorite [Tab]switch [m]hide menu [?]help [q]uit")
    } else {
        Cow::Borrowed("[h/l]prev/next [Enter]mark read [o]pen [r]eload [m]enu [?]help [q]uit")
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
