use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App};
use crate::config;
use crate::session::{Command, Session};
use crate::ui;

/// Main terminal event loop: advances the session clock, draws, and turns
/// key presses into session commands. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll = Duration::from_millis(settings.audio.tick_ms.max(1));

    loop {
        if let Err(e) = session.tick(Instant::now()) {
            log::warn!("playback: {e}");
            app.set_status(e.to_string());
        }
        app.clamp_selection(session.playlist().len());

        terminal.draw(|f| ui::draw(f, app, session))?;

        if event::poll(poll)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_action(app.handle_key(key.code, session), app, session) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply `action`; returns true when the loop should exit.
fn handle_action(action: Action, app: &mut App, session: &mut Session) -> bool {
    match action {
        Action::Quit => return true,
        Action::Dispatch(cmd) => {
            let connecting = matches!(cmd, Command::ConnectHardware);
            match session.dispatch(cmd) {
                Ok(()) if connecting && !session.hardware().connected => {
                    app.set_status("controller not found");
                }
                Ok(()) => app.clear_status(),
                Err(e) => {
                    log::warn!("command failed: {e}");
                    app.set_status(e.to_string());
                }
            }
        }
        Action::Redraw | Action::Ignored => {}
    }
    false
}
