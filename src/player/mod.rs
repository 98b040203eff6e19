//! External media player interface.
//!
//! The core never decodes video itself. It sends commands through
//! [`MediaPlayer`] and receives [`PlayerEvent`]s back from whichever
//! backend is in use.

#[cfg(unix)]
pub mod mpv;

/// Notifications emitted by a player backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Playback position moved, in milliseconds.
    PositionChanged(u64),
    /// Length of the loaded file became known, in milliseconds.
    DurationChanged(u64),
    /// The player began reading the most recently loaded file.
    ///
    /// Any `EndOfMedia` received before this belongs to the previous file.
    FileStarted,
    /// The loaded file played through to its end.
    EndOfMedia,
}

/// Commands accepted by a player backend.
pub trait MediaPlayer {
    /// Replace the current file with `path`.
    fn load_source(&mut self, path: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Jump to an absolute position in milliseconds.
    fn seek(&mut self, position_ms: u64);
    /// Output volume, 0 to 100.
    fn set_volume(&mut self, percent: u8);
    fn toggle_fullscreen(&mut self);
}
