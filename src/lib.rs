//! feedcycle: a terminal RSS reader that shows one feed at a time and moves
//! on to the next one when you stop interacting.

pub mod app;
pub mod config;
pub mod cycler;
pub mod favorites;
pub mod feed;
pub mod keybindings;
pub mod nav;
pub mod registry;
pub mod ui;
pub mod util;
pub mod view;
