//! Integration tests for lesson-tracker.
//!
//! These tests drive the controller against a real folder and a real state
//! file, with a recording player standing in for mpv.

use lesson_tracker::config::Config;
use lesson_tracker::controller::{Controller, PlaybackState};
use lesson_tracker::player::{MediaPlayer, PlayerEvent};
use lesson_tracker::playlist::{build_playlist, FsLister, ScanStatus};
use lesson_tracker::time_format::format_time;
use lesson_tracker::types::ProgressSummary;
use lesson_tracker::watch_state::{FileStorage, WatchStateStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingPlayer {
    loaded: Vec<String>,
    stops: usize,
}

impl MediaPlayer for RecordingPlayer {
    fn load_source(&mut self, path: &str) {
        self.loaded.push(path.to_string());
    }
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn stop(&mut self) {
        self.stops += 1;
    }
    fn seek(&mut self, _position_ms: u64) {}
    fn set_volume(&mut self, _percent: u8) {}
    fn toggle_fullscreen(&mut self) {}
}

fn lesson_folder(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    dir
}

fn controller_for(state_file: &Path) -> Controller<RecordingPlayer> {
    let store = WatchStateStore::load(Box::new(FileStorage::new(state_file)));
    Controller::new(store, Box::new(FsLister), RecordingPlayer::default())
}

/// A full session: play through one lesson, quit, come back.
#[test]
fn test_session_progress_survives_restart() {
    let lessons = lesson_folder(&["1.mp4", "2.mp4", "3.mp4"]);
    let data = TempDir::new().unwrap();
    let state_file = data.path().join("state.json");

    let mut controller = controller_for(&state_file);
    controller.load_folder(lessons.path());
    assert_eq!(
        controller.summary(),
        ProgressSummary {
            percent_complete: 0,
            remaining: 3
        }
    );

    controller.select_and_play(0);
    controller.handle_event(PlayerEvent::FileStarted);
    controller.handle_event(PlayerEvent::DurationChanged(60_000));
    controller.handle_event(PlayerEvent::PositionChanged(59_500));
    controller.handle_event(PlayerEvent::EndOfMedia);

    assert!(controller.is_watched(0));
    assert_eq!(controller.state(), PlaybackState::Playing(1));
    assert_eq!(controller.summary().to_display(), "33% complete, 2 left");

    controller.shutdown().unwrap();
    let player = controller.into_player();
    assert_eq!(player.loaded.len(), 2);
    assert_eq!(player.stops, 1);
    assert!(player.loaded[1].ends_with("2.mp4"));
    assert!(state_file.exists());

    let saved = fs::read_to_string(&state_file).unwrap();
    assert!(saved.contains("1.mp4"));

    // Next session reopens the same folder with the flag intact
    let mut controller = controller_for(&state_file);
    let playlist = controller.restore_last_folder().unwrap();
    assert_eq!(playlist.len(), 3);
    assert!(controller.is_watched(0));
    assert!(!controller.is_watched(1));
    assert_eq!(controller.first_unwatched(), Some(1));
    assert_eq!(controller.state(), PlaybackState::Ready);
}

#[test]
fn test_folder_scan_orders_numerically_and_skips_other_files() {
    let lessons = lesson_folder(&["10.mp4", "2.mp4", "notes.txt", "1.mp4", "intro.mp4"]);
    fs::create_dir(lessons.path().join("3.mp4")).unwrap();

    let playlist = build_playlist(&FsLister, lessons.path());
    let names: Vec<&str> = playlist
        .entries
        .iter()
        .map(|e| e.display_name.as_str())
        .collect();

    assert_eq!(names, vec!["1.mp4", "2.mp4", "10.mp4", "intro.mp4"]);
    assert_eq!(playlist.status, ScanStatus::Loaded);
}

#[test]
fn test_missing_folder_is_reported_not_fatal() {
    let data = TempDir::new().unwrap();
    let mut controller = controller_for(&data.path().join("state.json"));

    let playlist = controller.load_folder(&data.path().join("gone"));
    assert!(playlist.is_empty());
    assert!(playlist.load_failed());
    assert_eq!(controller.summary(), ProgressSummary::default());
}

#[test]
fn test_corrupt_state_file_starts_fresh() {
    let data = TempDir::new().unwrap();
    let state_file = data.path().join("state.json");
    fs::write(&state_file, "{ not json").unwrap();

    let mut controller = controller_for(&state_file);
    assert!(controller.restore_last_folder().is_none());
    assert_eq!(controller.store().folder(), "");

    // Saving replaces the corrupt record
    controller.shutdown().unwrap();
    let store = WatchStateStore::load(Box::new(FileStorage::new(&state_file)));
    assert!(store.state().watched.is_empty());
}

#[test]
fn test_unwatching_is_persisted() {
    let lessons = lesson_folder(&["1.mp4", "2.mp4"]);
    let data = TempDir::new().unwrap();
    let state_file = data.path().join("state.json");

    let mut controller = controller_for(&state_file);
    controller.load_folder(lessons.path());
    controller.toggle_watched(0, true);
    controller.toggle_watched(1, true);
    controller.toggle_watched(0, false);
    assert_eq!(controller.summary().to_display(), "50% complete, 1 left");
    controller.shutdown().unwrap();

    let mut controller = controller_for(&state_file);
    controller.restore_last_folder().unwrap();
    assert!(!controller.is_watched(0));
    assert!(controller.is_watched(1));
}

#[test]
fn test_config_defaults() {
    let config = Config::new();
    assert_eq!(config.player, "mpv");
    assert_eq!(config.skip_step_ms, 10_000);
    assert!(config.state_file.is_none());
}

#[test]
fn test_format_time_properties() {
    assert_eq!(format_time(0), "00");
    assert_eq!(format_time(59_999), "59");
    assert_eq!(format_time(3_600_000), "01:00:00");

    for ms in [1_000u64, 61_000, 3_599_000, 7_322_000] {
        let text = format_time(ms);
        let parts: Vec<u64> = text.split(':').map(|p| p.parse().unwrap()).collect();
        let secs = parts.iter().fold(0, |acc, p| acc * 60 + p);
        assert_eq!(secs, ms / 1000);
    }
}
