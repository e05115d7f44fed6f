use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::config::LoggingSettings;

fn log_path(settings: &LoggingSettings) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("fadeamp.log"))
}

/// Route `log` output to a file; the terminal belongs to the UI.
///
/// `RUST_LOG` wins over `logging.level`. When the file cannot be opened,
/// logging stays off rather than scribbling over the screen.
pub fn init_logging(settings: &LoggingSettings) {
    let path = log_path(settings);
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("fadeamp: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let result = Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init();

    if result.is_ok() {
        log::info!("fadeamp {} starting up", env!("CARGO_PKG_VERSION"));
    }
}
