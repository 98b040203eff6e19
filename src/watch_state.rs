//! Persistent watched/unwatched tracking for lesson-tracker.
//!
//! This module keeps the map of lesson path to watched flag, along with the
//! last folder the user opened, and reads/writes it as one JSON record so
//! progress survives between sessions.

use crate::error::{AppError, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchState {
    /// Last opened folder, empty when none.
    #[serde(default)]
    pub folder: String,

    /// Lesson path to watched flag. Entries for deleted files are kept.
    #[serde(default)]
    pub watched: BTreeMap<String, bool>,
}

/// Where the watch state record lives.
pub trait StateStorage {
    /// Read the raw record, `None` when nothing has been stored yet.
    fn read_record(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the stored record.
    fn write_record(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Stores the record as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the platform default location.
    pub fn at_default_path() -> io::Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Get the path to the state file.
    ///
    /// Returns ~/.local/share/lesson-tracker/state.json on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn default_path() -> io::Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Could not find data directory"))?
            .join("lesson-tracker");

        Ok(data_dir.join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    fn read_record(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename, so a crash never leaves half a file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }
}

/// In-memory watch state backed by a [`StateStorage`].
pub struct WatchStateStore {
    state: WatchState,
    storage: Box<dyn StateStorage>,
}

impl WatchStateStore {
    /// Load the stored state.
    ///
    /// A missing, unreadable or malformed record yields the default state;
    /// this never fails.
    pub fn load(storage: Box<dyn StateStorage>) -> Self {
        let state = match storage.read_record() {
            Ok(Some(bytes)) => match serde_json::from_slice::<WatchState>(&bytes) {
                Ok(state) => {
                    debug!(
                        "Loaded watch state: folder '{}', {} flags",
                        state.folder,
                        state.watched.len()
                    );
                    state
                }
                Err(e) => {
                    warn!("Watch state is corrupt ({}). Starting fresh.", e);
                    WatchState::default()
                }
            },
            Ok(None) => {
                debug!("No watch state stored yet");
                WatchState::default()
            }
            Err(e) => {
                warn!("Failed to read watch state ({}). Starting fresh.", e);
                WatchState::default()
            }
        };

        Self { state, storage }
    }

    /// Persist the folder and the full watched map, replacing the stored record.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_vec_pretty(&self.state)?;
        self.storage
            .write_record(&content)
            .map_err(|e| AppError::State(format!("failed to write watch state: {}", e)))?;
        info!("Saved watch state ({} flags)", self.state.watched.len());
        Ok(())
    }

    /// Watched flag for `path`, `false` when unknown.
    pub fn is_watched(&self, path: &str) -> bool {
        self.state.watched.get(path).copied().unwrap_or(false)
    }

    /// Set the watched flag in memory. Persisted on the next [`save`](Self::save).
    pub fn set_watched(&mut self, path: &str, value: bool) {
        self.state.watched.insert(path.to_string(), value);
    }

    pub fn folder(&self) -> &str {
        &self.state.folder
    }

    pub fn set_folder(&mut self, folder: &str) {
        self.state.folder = folder.to_string();
    }

    /// The current record.
    pub fn state(&self) -> &WatchState {
        &self.state
    }
}
