use std::path::PathBuf;

use crate::app::App;
use crate::config;
use crate::library;
use crate::session::{Command, Session};

/// Folders and files named on the command line, or the working directory.
pub fn selection_from_args(args: impl IntoIterator<Item = String>) -> Vec<PathBuf> {
    let paths: Vec<PathBuf> = args.into_iter().map(PathBuf::from).collect();
    if !paths.is_empty() {
        return paths;
    }
    match std::env::current_dir() {
        Ok(dir) => vec![dir],
        Err(_) => vec![PathBuf::from(".")],
    }
}

/// Build the session from settings and the initial selection, and connect
/// the controller when `hardware.auto_connect` is set.
pub fn start_session(settings: &config::Settings, selection: &[PathBuf], app: &mut App) -> Session {
    let tracks = library::collect(selection, &settings.library);
    log::info!(
        "library: {} tracks from {} location(s)",
        tracks.len(),
        selection.len()
    );
    if tracks.is_empty() {
        app.set_status("no audio files found");
    }

    let mut session = Session::new(settings, tracks);

    if settings.hardware.auto_connect {
        match session.dispatch(Command::ConnectHardware) {
            Ok(()) if session.hardware().connected => {}
            Ok(()) => app.set_status("controller not found"),
            Err(e) => app.set_status(format!("controller: {e}")),
        }
    }

    session
}
