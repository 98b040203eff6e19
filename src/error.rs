//! Error type shared by the library and the binary.

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum AppError {
    /// Filesystem or socket failure
    Io(io::Error),
    /// Malformed JSON (state file, player IPC messages)
    Parse(String),
    /// Unreadable or unwritable config file
    Config(String),
    /// Watch state could not be persisted
    State(String),
    /// Player not found, failed to start or stopped answering
    Player(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::State(msg) => write!(f, "State error: {}", msg),
            AppError::Player(msg) => write!(f, "Player error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let AppError::Io(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(format!("invalid config: {}", err))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(format!("could not serialize config: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
