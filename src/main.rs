//! Main entry point for the lesson-tracker application.

#[cfg(not(unix))]
compile_error!("lesson-tracker drives mpv over a Unix socket and only builds on Unix");

use clap::Parser;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lesson_tracker::config::Config;
use lesson_tracker::controller::{Controller, PlaybackState};
use lesson_tracker::error::Result as AppResult;
use lesson_tracker::player::mpv::MpvPlayer;
use lesson_tracker::player::{MediaPlayer, PlayerEvent};
use lesson_tracker::playlist::FsLister;
use lesson_tracker::tui::{draw, poll_event, Action, App};
use lesson_tracker::watch_state::{FileStorage, WatchStateStore};
use log::{debug, error, info, warn};
use ratatui::prelude::*;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// Command-line arguments for the lesson-tracker application.
#[derive(Parser, Debug)]
#[command(
    name = "lesson-tracker",
    version,
    about = "Track your progress through a folder of video lessons",
    long_about = "Play numbered .mp4 lessons in mpv, tick them off as watched and pick up where you left off."
)]
struct Args {
    /// Folder of lessons to open (defaults to the folder from last time)
    folder: Option<PathBuf>,

    /// Video player to use (overrides config)
    #[arg(short, long)]
    player: Option<String>,

    /// Watch state file (overrides config and platform default)
    #[arg(short, long)]
    state_file: Option<PathBuf>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Log file (defaults to lesson-tracker.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write a default config file if none exists, print its path and exit
    #[arg(long)]
    init_config: bool,
}

/// Search for an executable in the system PATH.
///
/// Paths containing a separator are checked directly.
fn find_in_path<P: AsRef<Path>>(exe_name: P) -> Option<PathBuf> {
    let exe_path = exe_name.as_ref();

    if exe_path.is_absolute()
        || exe_path
            .to_string_lossy()
            .contains(std::path::MAIN_SEPARATOR)
    {
        return exe_path.is_file().then(|| exe_path.to_path_buf());
    }

    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(exe_path))
            .find(|full_path| full_path.is_file())
    })
}

/// Default location of the log file.
fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("lesson-tracker").join("lesson-tracker.log"))
}

/// Send log records to a file; the terminal belongs to the TUI.
fn init_logging(level: u8, log_file: Option<PathBuf>) {
    let log_level = match level {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let Some(path) = log_file.or_else(default_log_path) else {
        eprintln!("Warning: could not find a data directory; logging disabled.");
        return;
    };

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            env_logger::Builder::new()
                .filter_level(log_level)
                .format_timestamp(None)
                .format_target(false)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            debug!("Log level set to {:?}", log_level);
        }
        Err(e) => {
            eprintln!(
                "Warning: could not open log file {}: {}. Logging disabled.",
                path.display(),
                e
            );
        }
    }
}

/// Expand a leading `~` and make the path absolute where possible.
fn resolve_folder(input: &Path) -> PathBuf {
    let expanded = match input.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| input.to_path_buf()),
        Err(_) => input.to_path_buf(),
    };
    fs::canonicalize(&expanded).unwrap_or(expanded)
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Point the list at a freshly loaded playlist and report unreadable folders.
fn sync_playlist<P: MediaPlayer>(app: &mut App, controller: &Controller<P>) {
    let Some(playlist) = controller.playlist() else {
        app.set_playlist(0, None);
        return;
    };

    app.set_playlist(playlist.len(), controller.first_unwatched());
    if playlist.load_failed() {
        app.set_error(&format!(
            "Could not read folder {}",
            playlist.folder.display()
        ));
    } else if playlist.is_empty() {
        app.set_status("No .mp4 files in this folder");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(args.log, args.log_file.clone());

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Load config
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Get player
    let player = args.player.clone().unwrap_or_else(|| config.player.clone());
    if find_in_path(&player).is_none() {
        eprintln!("Error: {} not found in PATH.", player);
        std::process::exit(1);
    }
    info!("Using video player: {}", player);

    // Load watch state
    let storage = match args
        .state_file
        .clone()
        .or_else(|| config.state_file.as_ref().map(PathBuf::from))
    {
        Some(path) => FileStorage::new(path),
        None => FileStorage::at_default_path()?,
    };
    info!("Watch state file: {}", storage.path().display());
    let store = WatchStateStore::load(Box::new(storage));

    let (mpv, mut events) = MpvPlayer::spawn(&player, &config.player_args).await?;

    let mut controller = Controller::new(store, Box::new(FsLister), mpv);
    controller.set_volume(config.volume);

    match &args.folder {
        Some(folder) => {
            controller.load_folder(&resolve_folder(folder));
        }
        None => {
            controller.restore_last_folder();
        }
    }

    // Initialize terminal
    let mut terminal = init_terminal()?;

    let mut app = App::new(config.keybindings.clone());
    sync_playlist(&mut app, &controller);

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &mut controller, &mut events, &config);

    // The only save point: flush folder and watched flags on the way out
    let (saved, restored) = finish_session(|| controller.shutdown(), restore_terminal);
    if let Err(e) = controller.into_player().shutdown().await {
        warn!("Failed to shut down player: {}", e);
    }

    if let Err(e) = saved {
        error!("{}", e);
        eprintln!("Error: progress was not saved: {}", e);
        std::process::exit(1);
    }
    restored?;
    result?;

    Ok(())
}

/// Save progress, then restore the terminal.
///
/// Both steps always run; a broken terminal must not cost the session's
/// watched flags.
fn finish_session<S, R>(save: S, restore: R) -> (AppResult<()>, io::Result<()>)
where
    S: FnOnce() -> AppResult<()>,
    R: FnOnce() -> io::Result<()>,
{
    let saved = save();
    let restored = restore();
    (saved, restored)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    controller: &mut Controller<MpvPlayer>,
    events: &mut UnboundedReceiver<PlayerEvent>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let skip_step = config.skip_step_ms.min(i64::MAX as u64) as i64;
    let volume_step = config.volume_step as i16;
    let mut player_gone = false;

    loop {
        // Draw UI
        terminal.draw(|f| draw(f, app, controller))?;

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            if key.kind == KeyEventKind::Press {
                let action = app.handle_input(key);

                match action {
                    Action::Quit => break,
                    Action::OpenFolder(ref input) => {
                        controller.load_folder(&resolve_folder(Path::new(input)));
                        sync_playlist(app, controller);
                    }
                    Action::Rescan => {
                        let folder = controller.playlist().map(|p| p.folder.clone());
                        match folder {
                            Some(folder) => {
                                controller.load_folder(&folder);
                                sync_playlist(app, controller);
                            }
                            None => app.set_status("No folder open"),
                        }
                    }
                    Action::Play(i) => {
                        controller.select_and_play(i);
                        app.follow(i);
                    }
                    Action::ToggleWatched(i) => {
                        let watched = controller.is_watched(i);
                        controller.toggle_watched(i, !watched);
                    }
                    Action::TogglePause => controller.toggle_pause(),
                    Action::Stop => controller.stop(),
                    Action::SkipBack => controller.skip(-skip_step),
                    Action::SkipForward => controller.skip(skip_step),
                    Action::SeekTo(ms) => {
                        if matches!(
                            controller.state(),
                            PlaybackState::Playing(_) | PlaybackState::Paused(_)
                        ) {
                            controller.seek(ms);
                        } else {
                            app.set_status("Nothing is playing");
                        }
                    }
                    Action::VolumeUp => controller.adjust_volume(volume_step),
                    Action::VolumeDown => controller.adjust_volume(-volume_step),
                    Action::ToggleFullscreen => controller.toggle_fullscreen(),
                    Action::None => {}
                }
            }
        }

        // Deliver player notifications, following auto-advance in the list
        let before = controller.current_index();
        loop {
            match events.try_recv() {
                Ok(event) => controller.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !player_gone {
                        player_gone = true;
                        warn!("Player connection closed");
                        app.set_error("The player has exited. Restart lesson-tracker to keep playing.");
                    }
                    break;
                }
            }
        }
        if let Some(index) = controller.current_index() {
            if Some(index) != before {
                app.follow(index);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_tracker::error::AppError;
    use std::cell::Cell;

    #[test]
    fn test_finish_session_saves_when_terminal_restore_fails() {
        let saved = Cell::new(false);
        let (save_result, restore_result) = finish_session(
            || {
                saved.set(true);
                Ok(())
            },
            || Err(io::Error::other("tty gone")),
        );

        assert!(saved.get());
        assert!(save_result.is_ok());
        assert!(restore_result.is_err());
    }

    #[test]
    fn test_finish_session_restores_when_save_fails() {
        let restored = Cell::new(false);
        let (save_result, restore_result) = finish_session(
            || Err(AppError::State("disk full".to_string())),
            || {
                restored.set(true);
                Ok(())
            },
        );

        assert!(restored.get());
        assert!(matches!(save_result, Err(AppError::State(_))));
        assert!(restore_result.is_ok());
    }

    #[test]
    fn test_resolve_folder_expands_home() {
        if let Some(home) = dirs::home_dir() {
            let resolved = resolve_folder(Path::new("~/no-such-lesson-folder"));
            assert!(resolved.starts_with(&home));
        }
    }
}
