use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_fadeamp_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("FADEAMP_CONFIG_PATH", "/tmp/fadeamp-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/fadeamp-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("fadeamp")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("fadeamp")
            .join("config.toml")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.analysis_size, 128);
    assert_eq!(s.playback.repeat, RepeatSetting::None);
    assert!(s.equalizer.enabled);
    assert!(!s.hardware.auto_connect);
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.25
analysis_size = 256
tick_ms = 20

[equalizer]
enabled = false
preset = "Rock"
bands = [1.0, 2.0, 3.0, 4.0, 5.0, -1.0, -2.0, -3.0, -4.0, -5.0]

[playback]
shuffle = true
repeat = "repeat-one"

[hardware]
port = "/dev/ttyACM0"
auto_connect = true

[library]
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false

[logging]
level = "debug"
file = "/tmp/fadeamp-test.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("FADEAMP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("FADEAMP__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.volume, 0.25);
    assert_eq!(s.audio.analysis_size, 256);
    assert_eq!(s.audio.tick_ms, 20);
    assert!(!s.equalizer.enabled);
    assert_eq!(s.equalizer.preset, "Rock");
    assert_eq!(s.equalizer.bands.as_ref().map(Vec::len), Some(10));
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.repeat, RepeatSetting::One);
    assert_eq!(s.hardware.port.as_deref(), Some("/dev/ttyACM0"));
    assert!(s.hardware.auto_connect);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.logging.level, "debug");
    assert_eq!(
        s.logging.file,
        Some(std::path::PathBuf::from("/tmp/fadeamp-test.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.9
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("FADEAMP_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("FADEAMP__AUDIO__VOLUME", "0.5");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 0.5);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.analysis_size = 100;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.equalizer.bands = Some(vec![0.0; 9]);
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.equalizer.bands = Some(vec![13.0; 10]);
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.equalizer.preset = "Polka".to_string();
    assert!(s.validate().is_err());
}
