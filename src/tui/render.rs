//! UI rendering functions for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::state::App;
use super::types::Prompt;
use crate::config::Keybindings;
use crate::controller::{Controller, PlaybackState};
use crate::player::MediaPlayer;
use crate::time_format::format_time;

/// Draw the UI.
pub fn draw<P: MediaPlayer>(frame: &mut Frame, app: &mut App, controller: &Controller<P>) {
    let size = frame.area();

    // Create main layout
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Content (list + now playing)
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, controller, chunks[0]);
    draw_progress(frame, controller, chunks[1]);

    if app.list_visible {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[2]);

        draw_lesson_list(frame, app, controller, content_chunks[0]);
        draw_now_playing(frame, controller, content_chunks[1]);
    } else {
        draw_now_playing(frame, controller, chunks[2]);
    }

    draw_footer(frame, app, chunks[3]);

    // Draw error popup if there's an error
    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if let Some(prompt) = app.prompt {
        draw_prompt(frame, prompt, &app.prompt_input);
    }

    // Draw help modal if shown
    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn draw_header<P: MediaPlayer>(frame: &mut Frame, controller: &Controller<P>, area: Rect) {
    let folder = controller
        .playlist()
        .map(|p| p.folder.display().to_string())
        .unwrap_or_else(|| "no folder".to_string());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "lesson-tracker",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", folder), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!("[vol {}]", controller.volume()),
            Style::default().fg(Color::Green),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_progress<P: MediaPlayer>(frame: &mut Frame, controller: &Controller<P>, area: Rect) {
    let summary = controller.summary();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(summary.percent_complete.min(100) as u16)
        .label(summary.to_display());

    frame.render_widget(gauge, area);
}

fn draw_lesson_list<P: MediaPlayer>(
    frame: &mut Frame,
    app: &mut App,
    controller: &Controller<P>,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title("Lessons");

    let Some(playlist) = controller.playlist() else {
        let hint = format!(
            "Press '{}' to open a folder of lessons",
            Keybindings::hint(&app.keybindings.open_folder)
        );
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    };

    if playlist.is_empty() {
        let (message, color) = if playlist.load_failed() {
            ("Could not read this folder", Color::Red)
        } else {
            ("No .mp4 files in this folder", Color::DarkGray)
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(color))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let current = controller.current_index();
    let items: Vec<ListItem> = controller
        .entries_with_flags()
        .into_iter()
        .enumerate()
        .map(|(i, (entry, watched))| {
            let marker = if Some(i) == current { "▶ " } else { "  " };
            let style = if watched {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}{}", marker, entry.to_display(watched))).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_now_playing<P: MediaPlayer>(frame: &mut Frame, controller: &Controller<P>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let state = controller.state();
    let state_style = match state {
        PlaybackState::Playing(_) => Style::default().fg(Color::Green),
        PlaybackState::Paused(_) => Style::default().fg(Color::Yellow),
        PlaybackState::Stopped(_) => Style::default().fg(Color::Red),
        PlaybackState::Idle | PlaybackState::Ready => Style::default().fg(Color::DarkGray),
    };

    let title = controller
        .current_entry()
        .map(|e| e.display_name.clone())
        .unwrap_or_else(|| "Nothing selected".to_string());

    let clock = format!(
        "{} / {}",
        format_time(controller.position_ms()),
        format_time(controller.duration_ms())
    );

    let text = vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(state.label(), state_style)),
        Line::from(clock),
    ];

    let info = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Now Playing"))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, chunks[0]);

    let ratio = if controller.duration_ms() > 0 {
        (controller.position_ms() as f64 / controller.duration_ms() as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let position = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label("");
    frame.render_widget(position, chunks[1]);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(prompt) = app.prompt {
        let verb = match prompt {
            Prompt::Folder => "open",
            Prompt::Seek => "jump",
        };
        format!("[Enter] {}  [Esc] cancel", verb)
    } else if let Some(status) = &app.status_message {
        status.clone()
    } else {
        let kb = &app.keybindings;
        format!(
            "[{}] play  [{}] watched  [{}] pause  [{}/{}] skip  [{}] open  [{}] help  [{}] quit",
            Keybindings::hint(&kb.play),
            Keybindings::hint(&kb.toggle_watched),
            Keybindings::hint(&kb.toggle_pause),
            Keybindings::hint(&kb.skip_back),
            Keybindings::hint(&kb.skip_forward),
            Keybindings::hint(&kb.open_folder),
            Keybindings::hint(&kb.help),
            Keybindings::hint(&kb.quit),
        )
    };

    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_prompt(frame: &mut Frame, prompt: Prompt, input: &str) {
    let area = centered_rect(60, 15, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(format!("{}{}", prompt.label(), input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(prompt.title())
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(popup, area);

    // Show cursor after the typed text, inside the border
    let offset = (prompt.label().chars().count() + input.chars().count()) as u16;
    frame.set_cursor_position((area.x + 1 + offset, area.y + 1));
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let help_text = Paragraph::new(get_help_content(&app.keybindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn get_help_content(kb: &Keybindings) -> String {
    let row = |keys: &[String], what: &str| format!("  {:<12}{}\n", keys.join(" / "), what);

    let mut content = String::from("Lessons\n───────\n");
    content.push_str(&row(&kb.up, "Move up"));
    content.push_str(&row(&kb.down, "Move down"));
    content.push_str(&row(&kb.play, "Play selected lesson"));
    content.push_str(&row(&kb.toggle_watched, "Mark watched / unwatched"));
    content.push_str(&row(&kb.toggle_list, "Show/hide the list"));
    content.push_str(&row(&kb.open_folder, "Open another folder"));
    content.push_str(&row(&kb.rescan, "Rescan the folder"));

    content.push_str("\nPlayback\n────────\n");
    content.push_str(&row(&kb.toggle_pause, "Pause / resume"));
    content.push_str(&row(&kb.stop, "Stop"));
    content.push_str(&row(&kb.skip_back, "Skip back"));
    content.push_str(&row(&kb.skip_forward, "Skip forward"));
    content.push_str(&row(&kb.seek, "Go to time"));
    content.push_str(&row(&kb.volume_up, "Volume up"));
    content.push_str(&row(&kb.volume_down, "Volume down"));
    content.push_str(&row(&kb.fullscreen, "Toggle fullscreen"));

    content.push_str("\nGlobal\n──────\n");
    content.push_str(&row(&kb.help, "Show/hide this help"));
    content.push_str(&row(&kb.quit, "Save and quit"));
    content.push_str("  Ctrl+C      Save and quit\n\n");
    content.push_str("A lesson is marked watched when it plays to the end,\n");
    content.push_str("and the next one starts automatically.\n\n");
    content.push_str(&format!("Press {} to close", Keybindings::hint(&kb.help)));
    content
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_configured_keys() {
        let mut kb = Keybindings::default();
        kb.quit = vec!["x".to_string()];
        let help = get_help_content(&kb);
        assert!(help.contains(&format!("  {:<12}Save and quit", "x")));
        assert!(help.contains("k / up"));
        assert!(help.contains("Go to time"));
    }

    #[test]
    fn test_help_close_hint_follows_binding() {
        let mut kb = Keybindings::default();
        kb.help = vec!["F1".to_string(), "?".to_string()];
        let help = get_help_content(&kb);
        assert!(help.ends_with("Press F1 to close"));
        assert!(!help.contains("Press ? to close"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 20, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert!(inner.width < outer.width);
    }
}
