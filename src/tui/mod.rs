//! Terminal User Interface for lesson-tracker using ratatui.
//!
//! This module provides a full-screen TUI with the lesson list, the
//! progress header and the now-playing pane.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::Action;

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
