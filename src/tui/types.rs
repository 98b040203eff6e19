//! TUI type definitions for actions.

/// Actions that can be returned from the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Load the folder at the given path
    OpenFolder(String),
    /// Scan the active folder again
    Rescan,
    /// Play the lesson at the given index
    Play(usize),
    /// Flip the watched flag of the lesson at the given index
    ToggleWatched(usize),
    /// Pause or resume playback
    TogglePause,
    /// Stop playback
    Stop,
    /// Jump backwards by the configured step
    SkipBack,
    /// Jump forwards by the configured step
    SkipForward,
    /// Jump to an absolute position in milliseconds
    SeekTo(u64),
    VolumeUp,
    VolumeDown,
    ToggleFullscreen,
}

/// Text prompts shown over the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Path of a folder to open
    Folder,
    /// Position to jump to in the current lesson
    Seek,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::Folder => "Open Folder",
            Prompt::Seek => "Go To Time",
        }
    }

    /// Text shown before the user's input.
    pub fn label(&self) -> &'static str {
        match self {
            Prompt::Folder => "Folder: ",
            Prompt::Seek => "Time (MM:SS): ",
        }
    }
}
