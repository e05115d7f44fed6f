use super::*;
use crate::audio::{CUSTOM_PRESET, PlaybackStatus};
use crate::config::RepeatSetting;
use std::time::Instant;

fn settings() -> Settings {
    let mut s = Settings::default();
    s.hardware.port = Some("/dev/fadeamp-no-such-port".to_string());
    s
}

fn tracks(names: &[&str]) -> Vec<Track> {
    names
        .iter()
        .map(|n| Track::new(format!("/nonexistent/{n}.mp3"), *n))
        .collect()
}

#[test]
fn session_starts_from_settings() {
    let mut s = settings();
    s.audio.volume = 0.4;
    s.playback.shuffle = true;
    s.playback.repeat = RepeatSetting::All;
    s.equalizer.preset = "Pop".to_string();

    let session = Session::new(&s, tracks(&["a", "b"]));
    let playback = session.playback();
    assert_eq!(playback.status, PlaybackStatus::Stopped);
    assert!(playback.shuffle);
    assert_eq!(playback.repeat, RepeatMode::All);
    assert_eq!(playback.current_index, Some(0));
    assert_eq!(session.volume(), 0.4);
    assert_eq!(session.equalizer().preset(), "Pop");
    assert!(!session.hardware().connected);
}

#[test]
fn eq_commands_round_trip_through_enable_toggle() {
    let mut session = Session::new(&settings(), Vec::new());
    session
        .dispatch(Command::SetBandGain { band: 2, db: 4.0 })
        .unwrap();
    session
        .dispatch(Command::SetBandGain { band: 7, db: -9.0 })
        .unwrap();
    let bands = *session.equalizer().bands();
    assert_eq!(session.equalizer().preset(), CUSTOM_PRESET);

    session.dispatch(Command::SetEqEnabled(false)).unwrap();
    assert_eq!(session.player.graph.applied_band_gains(), [0.0; EQ_BANDS]);
    session.dispatch(Command::SetEqEnabled(true)).unwrap();
    assert_eq!(session.player.graph.applied_band_gains(), bands);

    let rock = EqPreset::find("Rock").unwrap();
    session.dispatch(Command::ApplyPreset(rock)).unwrap();
    assert_eq!(session.equalizer().preset(), "Rock");
    assert_eq!(session.player.graph.applied_band_gains(), rock.values);

    assert!(matches!(
        session.dispatch(Command::SetBandGain { band: 11, db: 0.0 }),
        Err(SessionError::Audio(AudioError::BandOutOfRange(11)))
    ));
}

#[test]
fn play_with_empty_playlist_fails_cleanly() {
    let mut session = Session::new(&settings(), Vec::new());
    assert!(matches!(
        session.dispatch(Command::Play),
        Err(SessionError::Audio(AudioError::NothingToPlay))
    ));
    assert!(!session.playback().is_playing);
}

#[test]
fn unplayable_track_never_reports_playing() {
    let mut session = Session::new(&settings(), tracks(&["missing"]));
    assert!(session.dispatch(Command::Play).is_err());
    let playback = session.playback();
    assert!(!playback.is_playing);
    assert_eq!(playback.status, PlaybackStatus::Stopped);
    assert!(playback.track.is_none());
    assert!(session.sample_analysis().is_empty());
    assert!(session.tick(Instant::now()).is_ok());
}

#[test]
fn playlist_edits_while_stopped() {
    let mut session = Session::new(&settings(), tracks(&["a", "b"]));
    session
        .dispatch(Command::AddTracks(tracks(&["c"])))
        .unwrap();
    session
        .dispatch(Command::Reorder { from: 2, to: 0 })
        .unwrap();
    let names: Vec<&str> = session
        .playlist()
        .tracks()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
    assert_eq!(
        session.playlist().current_track().map(|t| t.name.as_str()),
        Some("a")
    );

    let a = session.playlist().get(1).unwrap().id;
    session.dispatch(Command::RemoveTrack(a)).unwrap();
    assert_eq!(session.playlist().len(), 2);
    assert_eq!(session.playback().current_index, Some(1));

    session
        .dispatch(Command::SetPlaylist(tracks(&["x"])))
        .unwrap();
    assert_eq!(session.playlist().len(), 1);
    assert_eq!(session.playback().current_index, Some(0));
}

#[test]
fn add_paths_scans_folders() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.mp3"), b"x").unwrap();
    std::fs::write(dir.path().join("two.flac"), b"x").unwrap();
    std::fs::write(dir.path().join("cover.jpg"), b"x").unwrap();

    let mut session = Session::new(&settings(), Vec::new());
    session
        .dispatch(Command::AddPaths(vec![dir.path().to_path_buf()]))
        .unwrap();
    assert_eq!(session.playlist().len(), 2);
    assert_eq!(session.playback().current_index, Some(0));
}

#[test]
fn shuffle_and_repeat_toggles() {
    let mut session = Session::new(&settings(), tracks(&["a"]));
    session.dispatch(Command::ToggleShuffle).unwrap();
    assert!(session.playback().shuffle);
    session.dispatch(Command::CycleRepeat).unwrap();
    assert_eq!(session.playback().repeat, RepeatMode::All);
    session.dispatch(Command::CycleRepeat).unwrap();
    assert_eq!(session.playback().repeat, RepeatMode::One);
}

#[test]
fn failing_hardware_connect_is_not_an_error() {
    let mut session = Session::new(&settings(), Vec::new());
    session.dispatch(Command::ConnectHardware).unwrap();
    assert!(!session.hardware().connected);
    session.dispatch(Command::DisconnectHardware).unwrap();
    assert!(!session.hardware().connected);
}

#[test]
fn controller_messages_reach_the_player() {
    let mut session = Session::new(&settings(), tracks(&["missing"]));
    let now = Instant::now();

    session
        .hardware
        .handle_line("VOLUME:0", now, &mut session.player);
    assert_eq!(session.volume(), 0.0);

    // Toggling on an unplayable track is logged, not propagated.
    session
        .hardware
        .handle_line("ENCODER_BTN", now, &mut session.player);
    assert!(!session.playback().is_playing);

    session
        .hardware
        .handle_line("ENCODER:CW", now, &mut session.player);
    assert_eq!(session.playback().current_index, Some(0));
}

#[test]
fn seek_by_never_goes_negative() {
    let mut session = Session::new(&settings(), Vec::new());
    assert!(session.dispatch(Command::SeekBy(-5)).is_err());
    assert_eq!(session.playback().current_time, Duration::ZERO);
}
