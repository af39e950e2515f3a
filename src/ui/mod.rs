//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout and overlay dispatch
//! - `entries` - Entry list widget
//! - `menu` - Feed list and favorites widgets
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod entries;
mod help;
mod input;
mod loop_runner;
mod menu;
mod render;
mod status;

pub use loop_runner::{run, Action};
