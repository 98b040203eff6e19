//! Configuration file support for lesson-tracker.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::error::Result;
use crossterm::event::{KeyCode, KeyEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Video player command
    #[serde(default = "default_player")]
    pub player: String,

    /// Additional arguments to pass to the video player
    #[serde(default)]
    pub player_args: Vec<String>,

    /// How far the skip keys jump, in milliseconds
    #[serde(default = "default_skip_step_ms")]
    pub skip_step_ms: u64,

    /// Volume at startup, 0 to 100
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Volume change per key press
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,

    /// Watch state file (overrides the platform default location)
    #[serde(default)]
    pub state_file: Option<String>,

    /// Key bindings for the lesson list and playback controls
    #[serde(default)]
    pub keybindings: Keybindings,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_player() -> String {
    "mpv".to_string()
}

fn default_skip_step_ms() -> u64 {
    10_000
}

fn default_volume() -> u8 {
    100
}

fn default_volume_step() -> u8 {
    5
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            player: default_player(),
            player_args: Vec::new(),
            skip_step_ms: default_skip_step_ms(),
            volume: default_volume(),
            volume_step: default_volume_step(),
            state_file: None,
            keybindings: Keybindings::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/lesson-tracker/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("lesson-tracker");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to an explicit path.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            Self::new().save_to(&path)?;
        }

        Ok(path)
    }
}

/// Key names bound to each command.
///
/// A name is either a single character (`"q"`, `"?"`, `"+"`) or one of
/// `up`, `down`, `left`, `right`, `enter`, `space`, `esc`, `tab`,
/// `backspace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub play: Vec<String>,
    pub toggle_watched: Vec<String>,
    pub toggle_pause: Vec<String>,
    pub stop: Vec<String>,
    pub skip_back: Vec<String>,
    pub skip_forward: Vec<String>,
    /// Open the go-to-time prompt
    pub seek: Vec<String>,
    pub volume_up: Vec<String>,
    pub volume_down: Vec<String>,
    pub fullscreen: Vec<String>,
    pub toggle_list: Vec<String>,
    pub open_folder: Vec<String>,
    pub rescan: Vec<String>,
    pub help: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: keys(&["k", "up"]),
            down: keys(&["j", "down"]),
            play: keys(&["enter"]),
            toggle_watched: keys(&["w"]),
            toggle_pause: keys(&["space", "p"]),
            stop: keys(&["s"]),
            skip_back: keys(&["h", "left"]),
            skip_forward: keys(&["l", "right"]),
            seek: keys(&["g"]),
            volume_up: keys(&["+", "="]),
            volume_down: keys(&["-"]),
            fullscreen: keys(&["f"]),
            toggle_list: keys(&["t"]),
            open_folder: keys(&["o"]),
            rescan: keys(&["r"]),
            help: keys(&["?"]),
            quit: keys(&["q"]),
        }
    }
}

impl Keybindings {
    /// Check whether `key` is one of the names in `binding`.
    pub fn matches(&self, binding: &[String], key: &KeyEvent) -> bool {
        let Some(name) = key_name(key) else {
            return false;
        };
        // Characters are case-sensitive, named keys are not
        if name.chars().count() == 1 {
            binding.iter().any(|b| *b == name)
        } else {
            binding.iter().any(|b| b.eq_ignore_ascii_case(&name))
        }
    }

    /// First name of a binding, for footer hints.
    pub fn hint(binding: &[String]) -> &str {
        binding.first().map(String::as_str).unwrap_or("?")
    }
}

/// Name of a key event as used in [`Keybindings`].
fn key_name(key: &KeyEvent) -> Option<String> {
    let name = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        _ => return None,
    };
    Some(name)
}
