//! Keybinding registry: maps actions to key events with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ToggleMenu,
    NavDown,
    NavUp,
    Select,
    NextFeed,
    PreviousFeed,
    Refresh,
    Favorite,
    Unfavorite,
    OpenInBrowser,
    CycleFocus,
    ShowHelp,
    Back,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::ToggleMenu => "Show / hide the feed menu",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::Select => "Mark entry read / load selected feed",
            Self::NextFeed => "Next feed",
            Self::PreviousFeed => "Previous feed",
            Self::Refresh => "Reload current feed",
            Self::Favorite => "Add feed to favorites",
            Self::Unfavorite => "Remove feed from favorites",
            Self::OpenInBrowser => "Open entry in browser",
            Self::CycleFocus => "Cycle panel focus",
            Self::ShowHelp => "Show help",
            Self::Back => "Go back / dismiss",
        }
    }
}

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// The help overlay is open.
    Help,
}

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Backspace", "Space"
/// - Modifier combos: "Ctrl+n"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
        return None;
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use KeyCode::{Char, Down, Enter, Esc, Left, Right, Tab, Up};

        let global = [
            (Char('q'), Quit),
            (Char('m'), ToggleMenu),
            (Char('j'), NavDown),
            (Down, NavDown),
            (Char('k'), NavUp),
            (Up, NavUp),
            (Enter, Select),
            (Char('l'), NextFeed),
            (Right, NextFeed),
            (Char('h'), PreviousFeed),
            (Left, PreviousFeed),
            (Char('r'), Refresh),
            (Char('f'), Favorite),
            (Char('u'), Unfavorite),
            (Char('o'), OpenInBrowser),
            (Tab, CycleFocus),
            (Char('?'), ShowHelp),
            (Esc, Back),
        ];
        for (code, action) in global {
            self.bind(Context::Global, KeySpec::plain(code), action);
        }

        // Help overlay: scroll with j/k, close with Esc, ? or q
        let help = [
            (Char('j'), NavDown),
            (Down, NavDown),
            (Char('k'), NavUp),
            (Up, NavUp),
            (Esc, Back),
            (Char('?'), Back),
            (Char('q'), Back),
        ];
        for (code, action) in help {
            self.bind(Context::Help, KeySpec::plain(code), action);
        }
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "next_feed").
    /// Values are key strings (e.g., "q", "Ctrl+n", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, _) in self.bindings.iter().filter(|(_, _, a)| *a == action) {
                if !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Contexts do not fall back to one another: while the help overlay is
    /// open only its own keys do anything.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        self.lookup
            .get(&(context, KeySpec::new(code, modifiers)))
            .copied()
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "toggle_menu" | "togglemenu" | "menu" => Some(Action::ToggleMenu),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "select" | "enter" | "activate" => Some(Action::Select),
        "next_feed" | "nextfeed" | "next" => Some(Action::NextFeed),
        "previous_feed" | "previousfeed" | "prev_feed" | "previous" | "prev" => {
            Some(Action::PreviousFeed)
        }
        "refresh" | "reload" => Some(Action::Refresh),
        "favorite" | "fav" => Some(Action::Favorite),
        "unfavorite" | "unfav" => Some(Action::Unfavorite),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "cycle_focus" | "cyclefocus" | "tab" => Some(Action::CycleFocus),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        "back" => Some(Action::Back),
        _ => None,
    }
}
