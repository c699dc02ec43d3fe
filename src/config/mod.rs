//! Configuration management for porthole.
//!
//! Settings come from an optional JSON file in the XDG config directory;
//! command-line flags override them.

mod settings;

pub use settings::{AppSettings, Paths};
