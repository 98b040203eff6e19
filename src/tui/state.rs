//! Application state management and input handling.

use crate::config::Keybindings;
use crate::time_format::parse_time;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Prompt};

/// Application state for the TUI.
///
/// Holds only what the screen needs between frames. Lessons, flags and
/// playback state are read from the controller when drawing.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,
    /// Cursor in the lesson list
    pub list_state: ListState,
    /// Number of lessons in the list
    pub lesson_count: usize,
    /// Whether the lesson list pane is shown
    pub list_visible: bool,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Text prompt currently shown, if any
    pub prompt: Option<Prompt>,
    /// Text typed into the prompt
    pub prompt_input: String,
    /// Status message for the footer
    pub status_message: Option<String>,
    /// Error message to display
    pub error_message: Option<String>,
    /// Custom keybindings
    pub keybindings: Keybindings,
}

impl App {
    /// Create a new App with default state.
    pub fn new(keybindings: Keybindings) -> Self {
        Self {
            should_quit: false,
            list_state: ListState::default(),
            lesson_count: 0,
            list_visible: true,
            show_help: false,
            prompt: None,
            prompt_input: String::new(),
            status_message: None,
            error_message: None,
            keybindings,
        }
    }

    /// Reset the list for a freshly loaded playlist.
    ///
    /// The cursor goes to `cursor` (usually the first unwatched lesson),
    /// or the top of the list.
    pub fn set_playlist(&mut self, lesson_count: usize, cursor: Option<usize>) {
        self.lesson_count = lesson_count;
        if lesson_count == 0 {
            self.list_state.select(None);
        } else {
            let i = cursor.unwrap_or(0).min(lesson_count - 1);
            self.list_state.select(Some(i));
        }
    }

    /// Move the cursor onto the lesson now playing.
    pub fn follow(&mut self, index: usize) {
        if index < self.lesson_count {
            self.list_state.select(Some(index));
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state
            .selected()
            .filter(|&i| i < self.lesson_count)
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        self.status_message = None;

        // Any key dismisses the error popup
        if self.error_message.is_some() {
            self.clear_error();
            return Action::None;
        }

        // Handle help modal
        if self.show_help {
            if key.code == KeyCode::Esc
                || self.keybindings.matches(&self.keybindings.help, &key)
                || self.keybindings.matches(&self.keybindings.quit, &key)
            {
                self.show_help = false;
            }
            return Action::None;
        }

        if let Some(prompt) = self.prompt {
            return self.handle_prompt_input(prompt, key);
        }

        self.handle_list_input(key)
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        self.prompt_input.clear();
    }

    fn handle_prompt_input(&mut self, prompt: Prompt, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                self.prompt = None;
                let input = self.prompt_input.trim().to_string();
                self.prompt_input.clear();
                if input.is_empty() {
                    return Action::None;
                }
                match prompt {
                    Prompt::Folder => Action::OpenFolder(input),
                    Prompt::Seek => match parse_time(&input) {
                        Some(ms) => Action::SeekTo(ms),
                        None => {
                            self.set_error(&format!(
                                "Invalid time '{}'. Use SS, MM:SS or HH:MM:SS.",
                                input
                            ));
                            Action::None
                        }
                    },
                }
            }
            KeyCode::Char(c) => {
                self.prompt_input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.prompt_input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.prompt_input.clear();
                self.prompt = None;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) -> Action {
        let kb = &self.keybindings;

        if kb.matches(&kb.up, &key) {
            let i = self.list_state.selected().unwrap_or(0);
            if i > 0 {
                self.list_state.select(Some(i - 1));
            }
            Action::None
        } else if kb.matches(&kb.down, &key) {
            let i = self.list_state.selected().unwrap_or(0);
            if i < self.lesson_count.saturating_sub(1) {
                self.list_state.select(Some(i + 1));
            }
            Action::None
        } else if kb.matches(&kb.play, &key) {
            match self.selected() {
                Some(i) => Action::Play(i),
                None => Action::None,
            }
        } else if kb.matches(&kb.toggle_watched, &key) {
            match self.selected() {
                Some(i) => Action::ToggleWatched(i),
                None => Action::None,
            }
        } else if kb.matches(&kb.toggle_pause, &key) {
            Action::TogglePause
        } else if kb.matches(&kb.stop, &key) {
            Action::Stop
        } else if kb.matches(&kb.skip_back, &key) {
            Action::SkipBack
        } else if kb.matches(&kb.skip_forward, &key) {
            Action::SkipForward
        } else if kb.matches(&kb.seek, &key) {
            self.open_prompt(Prompt::Seek);
            Action::None
        } else if kb.matches(&kb.volume_up, &key) {
            Action::VolumeUp
        } else if kb.matches(&kb.volume_down, &key) {
            Action::VolumeDown
        } else if kb.matches(&kb.fullscreen, &key) {
            Action::ToggleFullscreen
        } else if kb.matches(&kb.toggle_list, &key) {
            self.list_visible = !self.list_visible;
            Action::None
        } else if kb.matches(&kb.open_folder, &key) {
            self.open_prompt(Prompt::Folder);
            Action::None
        } else if kb.matches(&kb.rescan, &key) {
            Action::Rescan
        } else if kb.matches(&kb.help, &key) {
            self.show_help = true;
            Action::None
        } else if kb.matches(&kb.quit, &key) {
            self.should_quit = true;
            Action::Quit
        } else {
            Action::None
        }
    }
}
