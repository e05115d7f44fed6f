use super::*;
use crate::audio::{EQ_BANDS, EQ_PRESETS};
use crate::config::Settings;
use crate::library::Track;
use crate::session::{Command, Session};
use crossterm::event::KeyCode;

fn session(names: &[&str]) -> Session {
    let tracks = names
        .iter()
        .map(|n| Track::new(format!("/nonexistent/{n}.mp3"), *n))
        .collect();
    Session::new(&Settings::default(), tracks)
}

#[test]
fn cursor_wraps_both_ways() {
    let session = session(&["a", "b", "c"]);
    let mut app = App::new();

    assert!(matches!(app.handle_key(KeyCode::Char('k'), &session), Action::Redraw));
    assert_eq!(app.selected, 2);
    app.handle_key(KeyCode::Char('j'), &session);
    assert_eq!(app.selected, 0);
    app.handle_key(KeyCode::Down, &session);
    assert_eq!(app.selected, 1);
}

#[test]
fn cursor_is_clamped_when_the_playlist_shrinks() {
    let mut app = App::new();
    app.selected = 7;
    app.clamp_selection(3);
    assert_eq!(app.selected, 2);
    app.clamp_selection(0);
    assert_eq!(app.selected, 0);
}

#[test]
fn enter_selects_the_row_under_the_cursor() {
    let session = session(&["a", "b"]);
    let mut app = App::new();
    app.selected = 1;

    match app.handle_key(KeyCode::Enter, &session) {
        Action::Dispatch(Command::Select(1)) => {}
        other => panic!("unexpected {other:?}"),
    }

    let empty = self::session(&[]);
    assert!(matches!(app.handle_key(KeyCode::Enter, &empty), Action::Ignored));
}

#[test]
fn transport_keys_map_to_commands() {
    let session = session(&["a"]);
    let mut app = App::new();

    assert!(matches!(
        app.handle_key(KeyCode::Char(' '), &session),
        Action::Dispatch(Command::TogglePlay)
    ));
    assert!(matches!(
        app.handle_key(KeyCode::Char('l'), &session),
        Action::Dispatch(Command::Next)
    ));
    assert!(matches!(
        app.handle_key(KeyCode::Char('h'), &session),
        Action::Dispatch(Command::Prev)
    ));
    assert!(matches!(
        app.handle_key(KeyCode::Char('H'), &session),
        Action::Dispatch(Command::SeekBy(s)) if s == -SCRUB_SECONDS
    ));
    assert!(matches!(app.handle_key(KeyCode::Char('q'), &session), Action::Quit));
}

#[test]
fn volume_keys_step_from_current_volume() {
    let session = session(&[]);
    let mut app = App::new();
    let base = session.volume();

    match app.handle_key(KeyCode::Char('+'), &session) {
        Action::Dispatch(Command::SetVolume(v)) => assert!((v - (base + 0.05)).abs() < 1e-6),
        other => panic!("unexpected {other:?}"),
    }
    match app.handle_key(KeyCode::Char('-'), &session) {
        Action::Dispatch(Command::SetVolume(v)) => assert!((v - (base - 0.05)).abs() < 1e-6),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn reorder_keys_move_the_cursor_with_the_row() {
    let session = session(&["a", "b", "c"]);
    let mut app = App::new();

    match app.handle_key(KeyCode::Char('J'), &session) {
        Action::Dispatch(Command::Reorder { from: 0, to: 1 }) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(app.selected, 1);

    match app.handle_key(KeyCode::Char('K'), &session) {
        Action::Dispatch(Command::Reorder { from: 1, to: 0 }) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(app.selected, 0);

    assert!(matches!(app.handle_key(KeyCode::Char('K'), &session), Action::Ignored));
}

#[test]
fn remove_key_targets_the_selected_track_id() {
    let session = session(&["a", "b"]);
    let mut app = App::new();
    app.selected = 1;
    let id = session.playlist().get(1).map(|t| t.id);

    match app.handle_key(KeyCode::Char('d'), &session) {
        Action::Dispatch(Command::RemoveTrack(got)) => assert_eq!(Some(got), id),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn band_cursor_stays_within_the_equalizer() {
    let session = session(&[]);
    let mut app = App::new();

    app.handle_key(KeyCode::Char('['), &session);
    assert_eq!(app.band, 0);
    for _ in 0..20 {
        app.handle_key(KeyCode::Char(']'), &session);
    }
    assert_eq!(app.band, EQ_BANDS - 1);

    match app.handle_key(KeyCode::Char('}'), &session) {
        Action::Dispatch(Command::SetBandGain { band, db }) => {
            assert_eq!(band, EQ_BANDS - 1);
            assert_eq!(db, session.equalizer().bands()[EQ_BANDS - 1] + 1.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn preset_key_cycles_through_built_in_presets() {
    let session = session(&[]);
    let mut app = App::new();

    let mut names = Vec::new();
    for _ in 0..EQ_PRESETS.len() + 1 {
        match app.handle_key(KeyCode::Char('p'), &session) {
            Action::Dispatch(Command::ApplyPreset(p)) => names.push(p.name),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(names[0], EQ_PRESETS[0].name);
    assert_eq!(names[1], EQ_PRESETS[1].name);
    assert_eq!(names[EQ_PRESETS.len()], EQ_PRESETS[0].name);
}

#[test]
fn eq_and_hardware_toggles_follow_session_state() {
    let session = session(&[]);
    let mut app = App::new();

    let enabled = session.equalizer().enabled();
    match app.handle_key(KeyCode::Char('e'), &session) {
        Action::Dispatch(Command::SetEqEnabled(v)) => assert_eq!(v, !enabled),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        app.handle_key(KeyCode::Char('c'), &session),
        Action::Dispatch(Command::ConnectHardware)
    ));
}

#[test]
fn visualizer_key_flips_mode() {
    let session = session(&[]);
    let mut app = App::new();
    assert_eq!(app.visualizer, Visualizer::Waveform);
    app.handle_key(KeyCode::Char('v'), &session);
    assert_eq!(app.visualizer, Visualizer::Spectrum);
    app.handle_key(KeyCode::Char('v'), &session);
    assert_eq!(app.visualizer, Visualizer::Waveform);
}

#[test]
fn status_message_can_be_set_and_cleared() {
    let mut app = App::new();
    assert_eq!(app.status(), None);
    app.set_status("no serial port found");
    assert_eq!(app.status(), Some("no serial port found"));
    app.clear_status();
    assert_eq!(app.status(), None);
}
