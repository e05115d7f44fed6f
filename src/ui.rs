//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads from `Session` snapshots and the `App` model; no
//! state changes happen while drawing.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Sparkline, Wrap},
};

use crate::app::{App, SCRUB_SECONDS, Visualizer};
use crate::audio::{EQ_BANDS, EQ_FREQUENCIES, EQ_GAIN_LIMIT_DB, PlaybackStatus};
use crate::hardware::{HardwareSnapshot, LinkState, RAW_MAX};
use crate::session::Session;

const CONTROLS: &[(&str, &str)] = &[
    ("space", "play/pause"),
    ("enter", "play selected"),
    ("s", "stop"),
    ("h/l", "prev/next"),
    ("j/k", "up/down"),
    ("J/K", "move track"),
    ("d", "remove"),
    ("+/-", "volume"),
    ("z", "shuffle"),
    ("r", "repeat"),
    ("e", "eq on/off"),
    ("[/]", "band"),
    ("{/}", "gain"),
    ("p", "preset"),
    ("v", "visualizer"),
    ("c", "controller"),
    ("q", "quit"),
];

fn controls_text() -> String {
    let mut parts: Vec<String> = CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect();
    parts.insert(4, format!("[H/L] scrub -/+{SCRUB_SECONDS}s"));
    parts.join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_frequency(hz: f32) -> String {
    if hz >= 1000.0 {
        format!("{}k", hz / 1000.0)
    } else {
        format!("{hz}")
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// One text row per band: frequency, gain and a bar centred on 0 dB.
fn eq_lines(bands: &[f32; EQ_BANDS], cursor: usize, width: usize) -> Vec<String> {
    let half = (width / 2).max(1);
    bands
        .iter()
        .zip(EQ_FREQUENCIES.iter())
        .enumerate()
        .map(|(i, (&db, &hz))| {
            let cells = ((db.abs() / EQ_GAIN_LIMIT_DB) * half as f32).round() as usize;
            let cells = cells.min(half);
            let (left, right) = if db < 0.0 {
                (
                    format!("{}{}", " ".repeat(half - cells), "█".repeat(cells)),
                    " ".repeat(half),
                )
            } else {
                (" ".repeat(half), format!("{}{}", "█".repeat(cells), " ".repeat(half - cells)))
            };
            let marker = if i == cursor { '>' } else { ' ' };
            format!("{marker}{:>4} {:+5.1} {left}|{right}", format_frequency(hz), db)
        })
        .collect()
}

fn hardware_text(hw: &HardwareSnapshot) -> String {
    let state = match hw.state {
        LinkState::Disconnected => "disconnected",
        LinkState::Idle => "idle",
        LinkState::Touching => "touching",
    };
    let mut parts = vec![format!("Controller: {state}")];
    if let Some(port) = &hw.port {
        parts.push(format!("Port: {port}"));
    }
    if hw.connected {
        let raw = |v: Option<u16>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        parts.push(format!("Fader: {}/{RAW_MAX}", raw(hw.fader_position)));
        parts.push(format!("Target: {}", raw(hw.target_position)));
        parts.push(format!("Knob: {}", raw(hw.arduino_volume)));
        if hw.is_touching {
            parts.push("TOUCH".to_string());
        }
        if let Some(dir) = hw.last_encoder_direction {
            parts.push(format!("Encoder: {}", dir.as_str()));
        }
    }
    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_status(frame, app, session, chunks[0]);
    draw_progress(frame, session, chunks[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_visualizer(frame, app, session, middle[0]);
    draw_equalizer(frame, app, session, middle[1]);

    draw_playlist(frame, app, session, chunks[3]);

    let hw = Paragraph::new(hardware_text(session.hardware()))
        .block(padded(" controller "))
        .wrap(Wrap { trim: true });
    frame.render_widget(hw, chunks[4]);

    let footer = Paragraph::new(controls_text())
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_status(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let playback = session.playback();
    let mut parts: Vec<String> = Vec::new();

    let state = match playback.status {
        PlaybackStatus::Stopped => "Stopped",
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
    };
    match session.playlist().current_track() {
        Some(track) => parts.push(format!("{state}: {}", track.name)),
        None => parts.push(state.to_string()),
    }
    parts.push(format!("Repeat: {}", playback.repeat.label()));
    parts.push(format!(
        "Shuffle: {}",
        if playback.shuffle { "ON" } else { "OFF" }
    ));
    parts.push(format!("Volume: {:.0}%", session.volume() * 100.0));

    let mut text = parts.join(" • ");
    if let Some(msg) = app.status() {
        text.push('\n');
        text.push_str(msg);
    }

    let status = Paragraph::new(text)
        .block(padded(" fadeamp ").title_alignment(Alignment::Center))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_progress(frame: &mut Frame, session: &Session, area: Rect) {
    let playback = session.playback();
    let ratio = if playback.duration.is_zero() {
        0.0
    } else {
        (playback.current_time.as_secs_f64() / playback.duration.as_secs_f64()).clamp(0.0, 1.0)
    };
    let label = format!(
        "{} / {}",
        format_mmss(playback.current_time),
        format_mmss(playback.duration)
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_visualizer(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let samples = match app.visualizer {
        Visualizer::Waveform => session.sample_analysis(),
        Visualizer::Spectrum => session.sample_spectrum(),
    };
    // Silence is 128 on the oscilloscope; draw its distance from centre.
    let data: Vec<u64> = match app.visualizer {
        Visualizer::Waveform => samples.iter().map(|&b| u64::from(b.abs_diff(128))).collect(),
        Visualizer::Spectrum => samples.iter().map(|&b| u64::from(b)).collect(),
    };
    let max = match app.visualizer {
        Visualizer::Waveform => 128,
        Visualizer::Spectrum => 255,
    };

    let title = format!(" {} (v) ", app.visualizer.label());
    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(max);
    frame.render_widget(sparkline, area);
}

fn draw_equalizer(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let eq = session.equalizer();
    let width = usize::from(area.width.saturating_sub(16));
    let lines = eq_lines(eq.bands(), app.band, width).join("\n");

    let title = format!(
        " eq [{}] {} ",
        if eq.enabled() { "on" } else { "off" },
        eq.preset()
    );
    let mut par = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    if !eq.enabled() {
        par = par.dim();
    }
    frame.render_widget(par, area);
}

fn draw_playlist(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let playlist = session.playlist();
    let current = session.playback().current_index;

    let items: Vec<ListItem> = playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let time = if track.has_duration() {
                format_mmss(track.duration)
            } else {
                "--:--".to_string()
            };
            let marker = if Some(i) == current { "♪" } else { " " };
            let item = ListItem::new(format!("{marker} {:>3}. {} [{time}]", i + 1, track.name));
            if Some(i) == current {
                item.bold()
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" playlist ({}) ", playlist.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !playlist.is_empty() {
        state.select(Some(app.selected.min(playlist.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_lines_draw_cut_left_and_boost_right() {
        let mut bands = [0.0; EQ_BANDS];
        bands[0] = -12.0;
        bands[1] = 6.0;
        let lines = eq_lines(&bands, 1, 8);

        assert_eq!(lines.len(), EQ_BANDS);
        assert_eq!(lines[0], "   31 -12.0 ████|    ");
        assert_eq!(lines[1], ">  62  +6.0     |██  ");
        assert_eq!(lines[2], "  125  +0.0     |    ");
    }

    #[test]
    fn frequencies_use_k_suffix_above_one_khz() {
        assert_eq!(format_frequency(62.0), "62");
        assert_eq!(format_frequency(1000.0), "1k");
        assert_eq!(format_frequency(16000.0), "16k");
    }

    #[test]
    fn controls_text_mentions_scrub_step() {
        assert!(controls_text().contains(&format!("[H/L] scrub -/+{SCRUB_SECONDS}s")));
    }
}
