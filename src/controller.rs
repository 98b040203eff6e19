//! Playback progression for the active playlist.
//!
//! [`Controller`] owns the playlist, the watch state and the player. Every
//! user command and every player notification goes through it, one at a
//! time, so it is the only place the data model changes.

use crate::error::Result;
use crate::player::{MediaPlayer, PlayerEvent};
use crate::playlist::{build_playlist, DirectoryLister, Playlist};
use crate::progress::summarize;
use crate::types::{ProgressSummary, VideoEntry};
use crate::watch_state::WatchStateStore;
use log::{debug, info};
use std::path::Path;

/// Where the controller is in the play/advance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No playlist loaded.
    Idle,
    /// Playlist loaded, nothing selected.
    Ready,
    Playing(usize),
    Paused(usize),
    Stopped(usize),
}

impl PlaybackState {
    /// Index of the selected lesson, if any.
    pub fn index(&self) -> Option<usize> {
        match *self {
            PlaybackState::Playing(i) | PlaybackState::Paused(i) | PlaybackState::Stopped(i) => {
                Some(i)
            }
            PlaybackState::Idle | PlaybackState::Ready => None,
        }
    }

    /// Short label for the now-playing pane.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "No folder",
            PlaybackState::Ready => "Ready",
            PlaybackState::Playing(_) => "Playing",
            PlaybackState::Paused(_) => "Paused",
            PlaybackState::Stopped(_) => "Stopped",
        }
    }
}

/// Drives the player through a folder of lessons and records what was watched.
pub struct Controller<P: MediaPlayer> {
    player: P,
    lister: Box<dyn DirectoryLister>,
    store: WatchStateStore,
    playlist: Option<Playlist>,
    state: PlaybackState,
    position_ms: u64,
    duration_ms: u64,
    summary: ProgressSummary,
    volume: u8,
    /// A source was requested and the player has not yet started it.
    source_pending: bool,
}

impl<P: MediaPlayer> Controller<P> {
    pub fn new(store: WatchStateStore, lister: Box<dyn DirectoryLister>, player: P) -> Self {
        Self {
            player,
            lister,
            store,
            playlist: None,
            state: PlaybackState::Idle,
            position_ms: 0,
            duration_ms: 0,
            summary: ProgressSummary::default(),
            volume: 100,
            source_pending: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    /// Lessons of the active playlist, empty when none is loaded.
    pub fn entries(&self) -> &[VideoEntry] {
        self.playlist
            .as_ref()
            .map(|p| p.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Lessons paired with their watched flag, read fresh from the watch state.
    pub fn entries_with_flags(&self) -> Vec<(&VideoEntry, bool)> {
        self.entries()
            .iter()
            .map(|e| (e, self.store.is_watched(&e.path)))
            .collect()
    }

    pub fn is_watched(&self, index: usize) -> bool {
        self.entries()
            .get(index)
            .map(|e| self.store.is_watched(&e.path))
            .unwrap_or(false)
    }

    pub fn summary(&self) -> ProgressSummary {
        self.summary
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.index()
    }

    pub fn current_entry(&self) -> Option<&VideoEntry> {
        self.current_index().and_then(|i| self.entries().get(i))
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn store(&self) -> &WatchStateStore {
        &self.store
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// First lesson not yet watched, where a returning user picks up.
    pub fn first_unwatched(&self) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| !self.store.is_watched(&e.path))
    }

    fn recompute_summary(&mut self) {
        self.summary = summarize(self.entries(), &self.store);
    }

    fn reset_session(&mut self) {
        self.position_ms = 0;
        self.duration_ms = 0;
    }

    /// Scan `folder` and make it the active playlist.
    ///
    /// Always a full rescan, even for the folder already loaded. Whatever was
    /// playing is stopped.
    pub fn load_folder(&mut self, folder: &Path) -> &Playlist {
        if self.state.index().is_some() {
            self.player.stop();
        }

        let playlist = build_playlist(self.lister.as_ref(), folder);
        info!(
            "Loaded {} lessons from {}",
            playlist.len(),
            folder.display()
        );

        self.store.set_folder(&folder.to_string_lossy());
        self.state = PlaybackState::Ready;
        self.reset_session();
        let playlist = self.playlist.insert(playlist);
        self.summary = summarize(&playlist.entries, &self.store);
        playlist
    }

    /// Reopen the folder from the previous session if it still exists.
    pub fn restore_last_folder(&mut self) -> Option<&Playlist> {
        let folder = self.store.folder().to_string();
        if folder.is_empty() || !Path::new(&folder).is_dir() {
            debug!("No previous folder to restore");
            return None;
        }
        Some(self.load_folder(Path::new(&folder)))
    }

    /// Start playing the lesson at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the active playlist. Callers only pass
    /// indices taken from [`entries`](Self::entries).
    pub fn select_and_play(&mut self, index: usize) {
        let len = self.entries().len();
        assert!(
            index < len,
            "lesson index {} out of range for playlist of {}",
            index,
            len
        );

        let path = self.entries()[index].path.clone();
        info!("Playing lesson {}: {}", index, path);
        self.player.load_source(&path);
        self.player.play();
        self.reset_session();
        self.source_pending = true;
        self.state = PlaybackState::Playing(index);
    }

    /// The player started the source requested by the last
    /// [`select_and_play`](Self::select_and_play).
    pub fn on_file_started(&mut self) {
        self.source_pending = false;
    }

    /// The player finished the current file: mark it watched and move on.
    ///
    /// Ignored unless a lesson is playing and the player has reported
    /// starting it. An end of file arriving in between belongs to the
    /// lesson that was replaced.
    pub fn on_end_of_media(&mut self) {
        let PlaybackState::Playing(index) = self.state else {
            debug!("End of media ignored in state {:?}", self.state);
            return;
        };
        if self.source_pending {
            debug!("End of media for a replaced lesson ignored");
            return;
        }

        if let Some(entry) = self.entries().get(index) {
            let path = entry.path.clone();
            self.store.set_watched(&path, true);
        }
        self.recompute_summary();

        if index + 1 < self.entries().len() {
            self.select_and_play(index + 1);
        } else {
            info!("Reached the end of the playlist");
            self.position_ms = self.duration_ms;
            self.state = PlaybackState::Stopped(index);
        }
    }

    pub fn pause(&mut self) {
        if let PlaybackState::Playing(i) = self.state {
            self.player.pause();
            self.state = PlaybackState::Paused(i);
        }
    }

    /// Continue a paused lesson, or restart a stopped one.
    pub fn resume(&mut self) {
        match self.state {
            PlaybackState::Paused(i) => {
                self.player.play();
                self.state = PlaybackState::Playing(i);
            }
            PlaybackState::Stopped(i) => self.select_and_play(i),
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing(_) => self.pause(),
            PlaybackState::Paused(_) | PlaybackState::Stopped(_) => self.resume(),
            PlaybackState::Idle | PlaybackState::Ready => {}
        }
    }

    pub fn stop(&mut self) {
        if let PlaybackState::Playing(i) | PlaybackState::Paused(i) = self.state {
            self.player.stop();
            self.position_ms = 0;
            self.state = PlaybackState::Stopped(i);
        }
    }

    /// Jump to `position_ms`, clamped to the duration once it is known.
    pub fn seek(&mut self, position_ms: u64) {
        if !matches!(
            self.state,
            PlaybackState::Playing(_) | PlaybackState::Paused(_)
        ) {
            return;
        }
        let target = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };
        self.player.seek(target);
        self.position_ms = target;
    }

    /// Move by `delta_ms` (negative rewinds), clamped to `[0, duration]`.
    pub fn skip(&mut self, delta_ms: i64) {
        let target = (self.position_ms as i64).saturating_add(delta_ms).max(0) as u64;
        self.seek(target);
    }

    /// Manually set the watched flag of the lesson at `index`.
    pub fn toggle_watched(&mut self, index: usize, value: bool) {
        let Some(entry) = self.entries().get(index) else {
            return;
        };
        let path = entry.path.clone();
        debug!("Marking {} as {}", path, if value { "watched" } else { "unwatched" });
        self.store.set_watched(&path, value);
        self.recompute_summary();
    }

    pub fn on_position_changed(&mut self, position_ms: u64) {
        if self.state.index().is_some() {
            self.position_ms = position_ms;
        }
    }

    pub fn on_duration_changed(&mut self, duration_ms: u64) {
        if self.state.index().is_some() {
            self.duration_ms = duration_ms;
        }
    }

    /// Dispatch a player notification.
    pub fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::PositionChanged(ms) => self.on_position_changed(ms),
            PlayerEvent::DurationChanged(ms) => self.on_duration_changed(ms),
            PlayerEvent::FileStarted => self.on_file_started(),
            PlayerEvent::EndOfMedia => self.on_end_of_media(),
        }
    }

    pub fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        self.player.set_volume(self.volume);
    }

    /// Change volume by `delta` percentage points, staying within 0..=100.
    pub fn adjust_volume(&mut self, delta: i16) {
        let volume = (self.volume as i16 + delta).clamp(0, 100) as u8;
        self.set_volume(volume);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.player.toggle_fullscreen();
    }

    /// Stop playback and persist the watch state.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop();
        self.store.save()
    }

    /// Hand back the player, e.g. to shut its process down.
    pub fn into_player(self) -> P {
        self.player
    }
}
