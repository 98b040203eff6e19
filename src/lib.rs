//! A terminal tracker for working through a folder of numbered video lessons.
//!
//! lesson-tracker plays each lesson in an external player (mpv), lets you
//! tick lessons off as watched, remembers your progress between sessions and
//! moves on to the next lesson when one finishes.
//!
//! # Features
//!
//! - Lessons ordered by their numeric file name prefix (`1.mp4`, `2.mp4`, `10.mp4`)
//! - Watched flags persisted per file across sessions
//! - Progress summary with percent complete and lessons left
//! - Auto-advance to the next lesson at end of playback
//! - Reopens the last folder on start
//!
//! # Usage
//!
//! ```bash
//! # Reopen the folder from last time
//! cargo run
//!
//! # Open a specific folder
//! cargo run -- ~/courses/rust
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod player;
pub mod playlist;
pub mod progress;
pub mod time_format;
pub mod tui;
pub mod types;
pub mod watch_state;
