//! mpv backend driven over its JSON IPC socket.
//!
//! mpv is started idle with `--input-ipc-server`. One task writes command
//! lines to the socket, another turns incoming lines into [`PlayerEvent`]s
//! for the main loop.

use super::{MediaPlayer, PlayerEvent};
use crate::error::{AppError, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Observer id for the `time-pos` property.
const OBSERVE_TIME_POS: u64 = 1;
/// Observer id for the `duration` property.
const OBSERVE_DURATION: u64 = 2;

const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_DELAY: Duration = Duration::from_millis(100);
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// A line received from mpv. Replies to commands carry no `event` and are ignored.
#[derive(Debug, Deserialize)]
struct IpcMessage {
    event: Option<String>,
    name: Option<String>,
    data: Option<Value>,
    reason: Option<String>,
}

/// Wrap command arguments in an IPC request.
fn command(args: Vec<Value>) -> Value {
    json!({ "command": args })
}

/// Convert an mpv seconds value into milliseconds.
fn seconds_to_ms(value: &Value) -> Option<u64> {
    let secs = value.as_f64()?;
    if secs.is_finite() && secs >= 0.0 {
        Some((secs * 1000.0).round() as u64)
    } else {
        None
    }
}

/// Translate one IPC line into a player event, if it is one we care about.
pub fn parse_event(line: &str) -> Option<PlayerEvent> {
    let message: IpcMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring unparseable mpv message ({}): {}", e, line);
            return None;
        }
    };

    match message.event.as_deref()? {
        "property-change" => {
            let ms = message.data.as_ref().and_then(seconds_to_ms)?;
            match message.name.as_deref()? {
                "time-pos" => Some(PlayerEvent::PositionChanged(ms)),
                "duration" => Some(PlayerEvent::DurationChanged(ms)),
                _ => None,
            }
        }
        "start-file" => Some(PlayerEvent::FileStarted),
        // "stop" and "quit" also end a file but are not a finished lesson
        "end-file" if message.reason.as_deref() == Some("eof") => Some(PlayerEvent::EndOfMedia),
        _ => None,
    }
}

/// A running mpv process.
pub struct MpvPlayer {
    commands: UnboundedSender<Value>,
    child: Child,
    socket_path: PathBuf,
}

impl MpvPlayer {
    /// Start `program` (normally `mpv`) and connect to its IPC socket.
    ///
    /// Returns the player handle and the receiver for its events.
    pub async fn spawn(
        program: &str,
        extra_args: &[String],
    ) -> Result<(Self, UnboundedReceiver<PlayerEvent>)> {
        let socket_path = std::env::temp_dir().join(format!(
            "lesson-tracker-mpv-{}.sock",
            std::process::id()
        ));
        // A stale socket from a crashed run would make connect succeed too early
        let _ = std::fs::remove_file(&socket_path);

        let mut child = Command::new(program)
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--keep-open=no")
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    AppError::Player(format!(
                        "{} not found. Please install mpv: https://mpv.io/installation/",
                        program
                    ))
                } else {
                    AppError::Player(format!("Failed to start {}: {}", program, e))
                }
            })?;

        let stream = Self::connect(&mut child, &socket_path).await?;
        info!("Connected to {} at {}", program, socket_path.display());

        let (reader, mut writer) = stream.into_split();
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Value>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                let mut line = cmd.to_string();
                line.push('\n');
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    warn!("Failed to write to mpv: {}", e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = parse_event(&line) {
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("mpv closed its IPC socket");
                        break;
                    }
                    Err(e) => {
                        warn!("Failed to read from mpv: {}", e);
                        break;
                    }
                }
            }
        });

        let player = Self {
            commands: command_tx,
            child,
            socket_path,
        };
        player.send(vec![json!("observe_property"), json!(OBSERVE_TIME_POS), json!("time-pos")]);
        player.send(vec![json!("observe_property"), json!(OBSERVE_DURATION), json!("duration")]);

        Ok((player, event_rx))
    }

    async fn connect(child: &mut Child, socket_path: &Path) -> Result<UnixStream> {
        let mut last_error = None;
        for _ in 0..CONNECT_ATTEMPTS {
            match UnixStream::connect(socket_path).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
            if let Some(status) = child.try_wait()? {
                return Err(AppError::Player(format!(
                    "mpv exited before opening its IPC socket ({})",
                    status
                )));
            }
            tokio::time::sleep(CONNECT_DELAY).await;
        }

        Err(AppError::Player(format!(
            "Could not connect to mpv at {}: {}",
            socket_path.display(),
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn send(&self, args: Vec<Value>) {
        if self.commands.send(command(args)).is_err() {
            warn!("mpv is no longer connected; command dropped");
        }
    }

    /// Ask mpv to quit, killing it if it does not exit in time.
    pub async fn shutdown(mut self) -> Result<()> {
        self.send(vec![json!("quit")]);

        match tokio::time::timeout(QUIT_TIMEOUT, self.child.wait()).await {
            Ok(status) => {
                debug!("mpv exited with {}", status?);
            }
            Err(_) => {
                warn!("mpv did not quit in time; killing it");
                self.child.kill().await?;
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

impl MediaPlayer for MpvPlayer {
    fn load_source(&mut self, path: &str) {
        debug!("Loading {}", path);
        self.send(vec![json!("loadfile"), json!(path), json!("replace")]);
    }

    fn play(&mut self) {
        self.send(vec![json!("set_property"), json!("pause"), json!(false)]);
    }

    fn pause(&mut self) {
        self.send(vec![json!("set_property"), json!("pause"), json!(true)]);
    }

    fn stop(&mut self) {
        self.send(vec![json!("stop")]);
    }

    fn seek(&mut self, position_ms: u64) {
        let secs = position_ms as f64 / 1000.0;
        self.send(vec![json!("seek"), json!(secs), json!("absolute")]);
    }

    fn set_volume(&mut self, percent: u8) {
        self.send(vec![json!("set_property"), json!("volume"), json!(percent)]);
    }

    fn toggle_fullscreen(&mut self) {
        self.send(vec![json!("cycle"), json!("fullscreen")]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_pos() {
        let line = r#"{"event":"property-change","id":1,"name":"time-pos","data":12.3456}"#;
        assert_eq!(parse_event(line), Some(PlayerEvent::PositionChanged(12_346)));
    }

    #[test]
    fn test_parse_duration() {
        let line = r#"{"event":"property-change","id":2,"name":"duration","data":600.0}"#;
        assert_eq!(parse_event(line), Some(PlayerEvent::DurationChanged(600_000)));
    }

    #[test]
    fn test_parse_property_without_data() {
        let line = r#"{"event":"property-change","id":2,"name":"duration"}"#;
        assert_eq!(parse_event(line), None);
        let line = r#"{"event":"property-change","id":1,"name":"time-pos","data":null}"#;
        assert_eq!(parse_event(line), None);
    }

    #[test]
    fn test_parse_end_file_reasons() {
        let eof = r#"{"event":"end-file","reason":"eof","playlist_entry_id":1}"#;
        assert_eq!(parse_event(eof), Some(PlayerEvent::EndOfMedia));

        let stop = r#"{"event":"end-file","reason":"stop","playlist_entry_id":1}"#;
        assert_eq!(parse_event(stop), None);
    }

    #[test]
    fn test_parse_start_file() {
        let line = r#"{"event":"start-file","playlist_entry_id":2}"#;
        assert_eq!(parse_event(line), Some(PlayerEvent::FileStarted));
    }

    #[test]
    fn test_parse_ignores_replies_and_garbage() {
        assert_eq!(parse_event(r#"{"request_id":0,"error":"success"}"#), None);
        assert_eq!(parse_event(r#"{"event":"idle"}"#), None);
        assert_eq!(parse_event("not json"), None);
    }

    #[test]
    fn test_command_shape() {
        let cmd = command(vec![json!("loadfile"), json!("/course/1.mp4"), json!("replace")]);
        assert_eq!(
            cmd.to_string(),
            r#"{"command":["loadfile","/course/1.mp4","replace"]}"#
        );
    }

    #[test]
    fn test_seconds_to_ms_rejects_negative() {
        assert_eq!(seconds_to_ms(&json!(-1.0)), None);
        assert_eq!(seconds_to_ms(&json!(0)), Some(0));
    }
}
