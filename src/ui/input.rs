//! Input handling for the TUI.
//!
//! Key presses are resolved to actions through the keybinding registry and
//! dispatched on the current focus.

use crate::app::{App, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_url_for_open;
use anyhow::{Context as _, Result};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<Action> {
    // Any key counts as activity and postpones the next auto-cycle
    app.note_interaction();

    if app.show_help {
        handle_help_input(app, code, modifiers);
        return Ok(Action::Continue);
    }

    let Some(action) = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Global)
    else {
        return Ok(Action::Continue);
    };

    match action {
        KbAction::Quit => return Ok(Action::Quit),
        KbAction::ToggleMenu => app.toggle_menu(),
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::NextFeed => app.next(),
        KbAction::PreviousFeed => app.previous(),
        KbAction::Refresh => app.refresh(),
        KbAction::Select => match app.focus {
            Focus::Entries => {
                app.activate_selected();
            }
            Focus::Menu | Focus::Favorites => app.select_menu_feed(),
        },
        KbAction::Favorite => {
            if let Some(index) = app.focused_feed() {
                if !app.favorite(index) {
                    app.set_status("Already a favorite");
                }
            }
        }
        KbAction::Unfavorite => {
            if let Some(index) = app.focused_feed() {
                if !app.unfavorite(index) {
                    app.set_status("Not a favorite");
                }
            }
        }
        KbAction::OpenInBrowser => open_selected(app)?,
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::Back => {
            if app.menu_visible {
                app.toggle_menu();
            }
        }
    }

    Ok(Action::Continue)
}

/// Handle input while the help overlay is visible. Captures all keys.
fn handle_help_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Help) {
        Some(KbAction::Back) => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::NavDown) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        Some(KbAction::NavUp) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

/// Open the selected entry's link in the system browser.
///
/// Read state is left alone; only activation marks an entry read.
fn open_selected(app: &mut App) -> Result<()> {
    let Some(link) = app.selected_link().map(str::to_owned) else {
        app.set_status("No entry selected");
        return Ok(());
    };

    if let Err(e) = validate_url_for_open(&link) {
        app.set_status(e.to_string());
        return Ok(());
    }

    open::that_detached(&link).with_context(|| format!("Failed to open browser for {}", link))?;
    tracing::debug!(link = %link, "Opened entry in browser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppEvent;
    use crate::feed::{FeedSource, FetchError, FetchedEntry};
    use crate::registry::{FeedRegistry, FeedSeed};
    use futures::future::BoxFuture;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct EmptySource;

    impl FeedSource for EmptySource {
        fn fetch(&self, _url: &str) -> BoxFuture<'static, Result<Vec<FetchedEntry>, FetchError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn test_app() -> (App, mpsc::Receiver<AppEvent>) {
        test_app_cycling(Duration::ZERO)
    }

    fn test_app_cycling(period: Duration) -> (App, mpsc::Receiver<AppEvent>) {
        let registry = FeedRegistry::new(vec![
            FeedSeed::new("A", "https://a.example/feed"),
            FeedSeed::new("B", "https://b.example/feed"),
        ])
        .unwrap();
        let (tx, rx) = mpsc::channel(32);
        let app = App::new(registry, Arc::new(EmptySource), tx, period);
        (app, rx)
    }

    fn press(app: &mut App, c: char) -> Action {
        handle_input(app, KeyCode::Char(c), KeyModifiers::NONE).unwrap()
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut app, _rx) = test_app();
        assert!(matches!(press(&mut app, 'q'), Action::Quit));
    }

    #[tokio::test]
    async fn test_menu_key_toggles_once_per_press() {
        let (mut app, _rx) = test_app();
        press(&mut app, 'm');
        assert!(app.menu_visible);
        press(&mut app, 'm');
        assert!(!app.menu_visible);
    }

    #[tokio::test]
    async fn test_esc_hides_menu() {
        let (mut app, _rx) = test_app();
        press(&mut app, 'm');
        handle_input(&mut app, KeyCode::Esc, KeyModifiers::NONE).unwrap();
        assert!(!app.menu_visible);
    }

    #[tokio::test]
    async fn test_favorite_key_targets_menu_row() {
        let (mut app, _rx) = test_app();
        press(&mut app, 'm');
        handle_input(&mut app, KeyCode::Tab, KeyModifiers::NONE).unwrap();
        press(&mut app, 'j');
        press(&mut app, 'f');
        assert_eq!(app.favorites.rows(), &[1]);

        press(&mut app, 'f');
        assert_eq!(app.favorites.len(), 1);

        press(&mut app, 'u');
        assert!(app.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_next_key_loads_following_feed() {
        let (mut app, mut rx) = test_app();
        press(&mut app, 'l');
        let event = rx.recv().await.unwrap();
        app.handle_event(event);
        assert_eq!(app.nav.current(), 1);

        handle_input(&mut app, KeyCode::Right, KeyModifiers::NONE).unwrap();
        let event = rx.recv().await.unwrap();
        app.handle_event(event);
        assert_eq!(app.nav.current(), 0);
    }

    #[tokio::test]
    async fn test_help_captures_keys() {
        let (mut app, _rx) = test_app();
        press(&mut app, '?');
        assert!(app.show_help);

        // 'm' does nothing while help is open
        press(&mut app, 'm');
        assert!(!app.menu_visible);

        press(&mut app, 'j');
        assert_eq!(app.help_scroll_offset, 1);

        assert!(matches!(press(&mut app, 'q'), Action::Continue));
        assert!(!app.show_help);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_press_postpones_cycle() {
        let (mut app, mut rx) = test_app_cycling(Duration::from_secs(20));
        app.load_feed(0, None);
        let event = rx.recv().await.unwrap();
        app.handle_event(event);
        assert!(app.cycler.is_armed());

        tokio::time::sleep(Duration::from_secs(15)).await;
        press(&mut app, 'j');

        // The expiry that was due at 20s is gone; the next one is at 35s
        assert!(tokio::time::timeout(Duration::from_secs(19), rx.recv())
            .await
            .is_err());
        assert_eq!(app.loading, None);

        let event = rx.recv().await.unwrap();
        app.handle_event(event);
        assert_eq!(app.loading, Some(1));
    }

    #[tokio::test]
    async fn test_open_without_entries_sets_status() {
        let (mut app, _rx) = test_app();
        press(&mut app, 'o');
        assert!(app.status_message.is_some());
    }
}
