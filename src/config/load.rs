use std::{env, path::PathBuf};

use crate::audio::{EQ_BANDS, EQ_GAIN_LIMIT_DB, EqPreset};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `FADEAMP__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FADEAMP")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be within [0, 1]".to_string());
        }
        let size = self.audio.analysis_size;
        if !size.is_power_of_two() || !(32..=2048).contains(&size) {
            return Err("audio.analysis_size must be a power of two in 32..=2048".to_string());
        }
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        if let Some(bands) = &self.equalizer.bands {
            if bands.len() != EQ_BANDS {
                return Err(format!("equalizer.bands must hold {EQ_BANDS} values"));
            }
            if bands.iter().any(|db| db.abs() > EQ_GAIN_LIMIT_DB) {
                return Err(format!(
                    "equalizer.bands values must be within +/-{EQ_GAIN_LIMIT_DB} dB"
                ));
            }
        } else if EqPreset::find(&self.equalizer.preset).is_none() {
            return Err(format!("unknown equalizer.preset {:?}", self.equalizer.preset));
        }
        Ok(())
    }
}

/// Resolve the config path from `FADEAMP_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FADEAMP_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/fadeamp/config.toml`
/// or `~/.config/fadeamp/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("fadeamp").join("config.toml"))
}
