//! Utility functions shared by the feed and UI layers.
//!
//! - **URL validation**: SSRF checks for imported feed URLs and a scheme
//!   check before handing entry links to the browser
//! - **Text processing**: terminal-width truncation, control character
//!   stripping and HTML-to-text reduction for entry previews

mod text;
mod url_validator;

pub use text::{display_width, html_to_text, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};
