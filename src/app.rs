use crate::cycler::InactivityCycler;
use crate::favorites::Favorites;
use crate::feed::{FeedSource, FetchError, FetchedEntry};
use crate::keybindings::KeybindingRegistry;
use crate::nav::Navigation;
use crate::registry::{FavoriteStatus, FeedDescriptor, FeedRegistry};
use crate::view::{render_entries, FeedView};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How a feed load ended, as reported to its completion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

/// Completion handler for [`App::load_feed`]. Fired exactly once per load,
/// whether the fetch succeeded or not.
pub type Completion = oneshot::Sender<LoadOutcome>;

/// Events from background tasks
pub enum AppEvent {
    /// A fetch spawned by [`App::load_feed`] finished.
    FeedLoaded {
        index: usize,
        result: Result<Vec<FetchedEntry>, FetchError>,
        completion: Option<Completion>,
    },
    /// The inactivity cycler's period elapsed.
    ///
    /// `generation` identifies the timer that fired; expiries from a timer
    /// that has since been re-armed or cancelled are dropped.
    InactivityElapsed { generation: u64 },
}

/// Which panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entries,
    /// The feed list in the menu.
    Menu,
    /// The favorites list in the menu.
    Favorites,
}

/// Central application state
pub struct App {
    pub registry: FeedRegistry,
    pub nav: Navigation,
    pub cycler: InactivityCycler,
    pub favorites: Favorites,
    pub keybindings: KeybindingRegistry,

    /// Entry list of the last successfully loaded feed. `None` until the
    /// first load completes.
    pub view: Option<FeedView>,

    // UI State
    pub focus: Focus,
    pub menu_visible: bool,
    pub selected_entry: usize,
    pub selected_menu_row: usize,
    pub selected_favorite: usize,
    /// Feed index of the most recent load request still in flight.
    pub loading: Option<usize>,
    /// Current frame of the loading spinner, advanced by the UI tick.
    pub spinner_frame: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    /// Whether the help overlay is currently displayed.
    pub show_help: bool,
    /// Scroll offset in the help screen for long keybinding lists.
    pub help_scroll_offset: usize,

    source: Arc<dyn FeedSource>,
    event_tx: mpsc::Sender<AppEvent>,
    /// In-flight fetch tasks, aborted on drop.
    load_handles: Vec<JoinHandle<()>>,
}

impl App {
    /// `cycle_period` of zero disables the inactivity cycler.
    pub fn new(
        registry: FeedRegistry,
        source: Arc<dyn FeedSource>,
        event_tx: mpsc::Sender<AppEvent>,
        cycle_period: Duration,
    ) -> Self {
        Self {
            nav: Navigation::new(registry.len()),
            registry,
            cycler: InactivityCycler::new(cycle_period, event_tx.clone()),
            favorites: Favorites::new(),
            keybindings: KeybindingRegistry::new(),
            view: None,
            focus: Focus::Entries,
            menu_visible: false,
            selected_entry: 0,
            selected_menu_row: 0,
            selected_favorite: 0,
            loading: None,
            spinner_frame: 0,
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            source,
            event_tx,
            load_handles: Vec::new(),
        }
    }

    /// Descriptor of the feed the navigation cursor is on.
    pub fn current_feed(&self) -> Option<&FeedDescriptor> {
        self.registry.get(self.nav.current())
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Fetch feed `index` in the background.
    ///
    /// The result comes back as [`AppEvent::FeedLoaded`] and is applied by
    /// [`App::handle_event`]. An out-of-range index is logged and reported
    /// as [`LoadOutcome::Failed`] without fetching anything.
    pub fn load_feed(&mut self, index: usize, completion: Option<Completion>) {
        let Some(feed) = self.registry.get(index) else {
            tracing::warn!(index, feeds = self.registry.len(), "Ignoring load of unknown feed");
            if let Some(tx) = completion {
                let _ = tx.send(LoadOutcome::Failed);
            }
            return;
        };

        tracing::debug!(index, url = %feed.url, "Loading feed");
        let fetch = self.source.fetch(&feed.url);
        let tx = self.event_tx.clone();

        self.load_handles.retain(|h| !h.is_finished());
        self.load_handles.push(tokio::spawn(async move {
            let result = fetch.await;
            let event = AppEvent::FeedLoaded {
                index,
                result,
                completion,
            };
            if tx.send(event).await.is_err() {
                tracing::debug!(index, "Event channel closed, dropping feed load result");
            }
        }));

        self.loading = Some(index);
        self.needs_redraw = true;
    }

    /// Apply a finished fetch.
    ///
    /// On success the entries are stored (first load only), the feed
    /// becomes current, its entry list is rendered and the inactivity timer
    /// restarts. On failure nothing but the status line changes. Either
    /// way the completion fires.
    pub fn handle_feed_loaded(
        &mut self,
        index: usize,
        result: Result<Vec<FetchedEntry>, FetchError>,
        completion: Option<Completion>,
    ) {
        if self.loading == Some(index) {
            self.loading = None;
        }

        let outcome = match result {
            Ok(entries) => {
                let fetched = entries.len();
                let stored = self.registry.populate_entries(index, entries);
                self.nav.set_current(index);
                self.selected_entry = 0;
                self.render_current();
                self.cycler.arm();
                tracing::info!(index, fetched, first_load = stored, "Feed loaded");
                LoadOutcome::Loaded
            }
            Err(e) => {
                let name = self
                    .registry
                    .get(index)
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                tracing::warn!(index, feed = %name, error = %e, "Feed load failed");
                self.set_status(format!("Failed to load {}: {}", name, e));
                LoadOutcome::Failed
            }
        };

        self.needs_redraw = true;
        if let Some(tx) = completion {
            // Receiver may have gone away; the load is applied regardless.
            let _ = tx.send(outcome);
        }
    }

    /// Dispatch a background event.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FeedLoaded {
                index,
                result,
                completion,
            } => self.handle_feed_loaded(index, result, completion),
            AppEvent::InactivityElapsed { generation } => self.handle_inactivity(generation),
        }
    }

    /// Advance to the next feed if the expiry came from the live timer.
    ///
    /// Skipped while a load is still in flight, so a fetch that never
    /// answers is not requested again every period.
    pub fn handle_inactivity(&mut self, generation: u64) {
        if !self.cycler.is_current(generation) {
            tracing::trace!(generation, "Dropping stale inactivity expiry");
            return;
        }
        if let Some(index) = self.loading {
            tracing::debug!(index, "Load still in flight, not cycling");
            return;
        }
        tracing::debug!(
            from = self.nav.current(),
            to = self.nav.next_index(),
            "Inactivity period elapsed, cycling feed"
        );
        self.next();
    }

    /// Restart the inactivity countdown after user input.
    ///
    /// An idle cycler stays idle: only a successful load starts it.
    pub fn note_interaction(&mut self) {
        if self.cycler.is_armed() {
            self.cycler.arm();
        }
    }

    /// Re-render the entry list from the registry for the current feed.
    fn render_current(&mut self) {
        let Some(feed) = self.registry.get(self.nav.current()) else {
            return;
        };
        let entries = feed.entries.as_deref().unwrap_or_default();
        let view = render_entries(&feed.name, entries);
        self.selected_entry = self
            .selected_entry
            .min(view.entries.len().saturating_sub(1));
        self.view = Some(view);
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Load the feed after the current one, wrapping to the first.
    pub fn next(&mut self) {
        self.load_feed(self.nav.next_index(), None);
    }

    /// Load the feed before the current one, wrapping to the last.
    pub fn previous(&mut self) {
        self.load_feed(self.nav.previous_index(), None);
    }

    pub fn jump_to(&mut self, index: usize) {
        self.load_feed(index, None);
    }

    /// Reload the current feed. Stored entries and their read state are kept.
    pub fn refresh(&mut self) {
        self.load_feed(self.nav.current(), None);
    }

    // ------------------------------------------------------------------
    // Menu
    // ------------------------------------------------------------------

    pub fn toggle_menu(&mut self) {
        self.menu_visible = !self.menu_visible;
        if self.menu_visible {
            self.selected_menu_row = self.nav.current();
        } else {
            self.focus = Focus::Entries;
        }
        self.needs_redraw = true;
    }

    /// Hide the menu and load the feed under the menu cursor.
    pub fn select_menu_feed(&mut self) {
        let index = match self.focus {
            Focus::Favorites => match self.favorites.rows().get(self.selected_favorite) {
                Some(&index) => index,
                None => return,
            },
            _ => self.selected_menu_row,
        };
        self.menu_visible = false;
        self.focus = Focus::Entries;
        self.jump_to(index);
    }

    /// Tab order: entries, feed list, favorites (when non-empty). Only the
    /// entry list is reachable while the menu is hidden.
    pub fn cycle_focus(&mut self) {
        self.focus = match (self.menu_visible, self.focus) {
            (false, _) => Focus::Entries,
            (true, Focus::Entries) => Focus::Menu,
            (true, Focus::Menu) if !self.favorites.is_empty() => Focus::Favorites,
            (true, Focus::Menu) | (true, Focus::Favorites) => Focus::Entries,
        };
        self.needs_redraw = true;
    }

    /// Navigate up in current list
    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Entries => self.selected_entry = self.selected_entry.saturating_sub(1),
            Focus::Menu => self.selected_menu_row = self.selected_menu_row.saturating_sub(1),
            Focus::Favorites => {
                self.selected_favorite = self.selected_favorite.saturating_sub(1)
            }
        }
        self.needs_redraw = true;
    }

    /// Navigate down in current list
    pub fn nav_down(&mut self) {
        let len = match self.focus {
            Focus::Entries => self.view.as_ref().map_or(0, |v| v.entries.len()),
            Focus::Menu => self.registry.len(),
            Focus::Favorites => self.favorites.len(),
        };
        let max_index = len.saturating_sub(1);
        let selected = match self.focus {
            Focus::Entries => &mut self.selected_entry,
            Focus::Menu => &mut self.selected_menu_row,
            Focus::Favorites => &mut self.selected_favorite,
        };
        *selected = selected.saturating_add(1).min(max_index);
        self.needs_redraw = true;
    }

    /// The feed a favorite/unfavorite key acts on: the row under the cursor
    /// when a menu list has focus, otherwise the current feed.
    pub fn focused_feed(&self) -> Option<usize> {
        match self.focus {
            Focus::Entries => Some(self.nav.current()),
            Focus::Menu => Some(self.selected_menu_row),
            Focus::Favorites => self.favorites.rows().get(self.selected_favorite).copied(),
        }
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Flag a feed as favorite and add it to the favorites list.
    ///
    /// Returns `false` (and changes nothing) if the feed is unknown or
    /// already a favorite.
    pub fn favorite(&mut self, index: usize) -> bool {
        match self.registry.get(index) {
            Some(feed) if !feed.is_favorite() => {}
            _ => return false,
        }
        self.registry.set_favorite(index, FavoriteStatus::Favorite);
        self.favorites.add(index);
        if let Some(feed) = self.registry.get(index) {
            tracing::debug!(index, feed = %feed.name, "Added favorite");
            self.set_status(format!("★ {}", feed.name));
        }
        self.needs_redraw = true;
        true
    }

    /// Clear a feed's favorite flag and drop its favorites row.
    ///
    /// Returns `false` if the feed was not a favorite.
    pub fn unfavorite(&mut self, index: usize) -> bool {
        match self.registry.get(index) {
            Some(feed) if feed.is_favorite() => {}
            _ => return false,
        }
        self.registry.set_favorite(index, FavoriteStatus::None);
        self.favorites.remove(index);
        self.selected_favorite = self
            .selected_favorite
            .min(self.favorites.len().saturating_sub(1));
        if self.favorites.is_empty() && self.focus == Focus::Favorites {
            self.focus = Focus::Menu;
        }
        tracing::debug!(index, "Removed favorite");
        self.needs_redraw = true;
        true
    }

    // ------------------------------------------------------------------
    // Read tracking
    // ------------------------------------------------------------------

    /// Handle activation of an entry link.
    ///
    /// Nothing is opened. The first loaded entry anywhere in the registry
    /// whose link equals `link` becomes read; an unknown link is ignored.
    pub fn activate_entry(&mut self, link: &str) -> bool {
        let Some((feed_idx, entry_idx)) = self.registry.mark_read(link) else {
            tracing::trace!(link = %link, "Activated link matches no loaded entry");
            return false;
        };
        tracing::debug!(feed = feed_idx, entry = entry_idx, "Marked entry read");
        if self.view.is_some() && feed_idx == self.nav.current() {
            self.render_current();
        }
        self.needs_redraw = true;
        true
    }

    /// Link of the entry under the cursor, if any.
    pub fn selected_link(&self) -> Option<&str> {
        self.view
            .as_ref()?
            .entries
            .get(self.selected_entry)
            .map(|e| e.link.as_str())
    }

    /// Activate the entry under the cursor.
    pub fn activate_selected(&mut self) -> bool {
        match self.selected_link().map(str::to_owned) {
            Some(link) => self.activate_entry(&link),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Status line
    // ------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Abort in-flight fetches so no task outlives the UI loop.
impl Drop for App {
    fn drop(&mut self) {
        for handle in self.load_handles.drain(..) {
            handle.abort();
        }
    }
}
