//! Console configuration – reads/writes `~/.frcvision/config.toml`.

use frcvision_types::VisionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persisted console configuration stored in `~/.frcvision/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the vision service web server (`http://frcvision.local`).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Delay between reconnection attempts while the service is unreachable.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Period, in seconds, of the service's stream statistics pushes.
    #[serde(default = "default_stream_stats_period_secs")]
    pub stream_stats_period_secs: f64,
}

fn default_server_url() -> String {
    "http://localhost".to_string()
}
fn default_reconnect_interval_ms() -> u64 {
    2000
}
fn default_stream_stats_period_secs() -> f64 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            stream_stats_period_secs: default_stream_stats_period_secs(),
        }
    }
}

impl Config {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

/// Return the path to `~/.frcvision/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".frcvision").join("config.toml")
}

/// Load the config from disk, falling back to defaults when the file does
/// not exist.  Environment overrides are applied either way.
pub fn load() -> Result<Config, VisionError> {
    let mut cfg = load_from(&config_path())?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if it is missing.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, VisionError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        VisionError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| VisionError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(Some(cfg))
}

/// Apply `FRCVISION_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `FRCVISION_SERVER_URL` | `server_url` |
/// | `FRCVISION_RECONNECT_MS` | `reconnect_interval_ms` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FRCVISION_SERVER_URL") {
        cfg.server_url = v;
    }
    if let Ok(v) = std::env::var("FRCVISION_RECONNECT_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.reconnect_interval_ms = ms;
    }
}

/// Save the config to disk, creating `~/.frcvision/` if necessary.
pub fn save(cfg: &Config) -> Result<(), VisionError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), VisionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VisionError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| VisionError::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        VisionError::Config(format!("Failed to write config at {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.server_url, "http://localhost");
        assert_eq!(loaded.reconnect_interval(), Duration::from_millis(2000));
        assert_eq!(loaded.stream_stats_period_secs, 1.0);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "server_url = \"http://10.2.94.11\"\n").unwrap();

        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.server_url, "http://10.2.94.11");
        assert_eq!(loaded.reconnect_interval_ms, 2000);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "server_url = [").unwrap();
        assert!(matches!(load_from(&path), Err(VisionError::Config(_))));
    }

    #[test]
    fn config_path_points_to_frcvision_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".frcvision"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_server_url() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FRCVISION_SERVER_URL", "http://frcvision.local") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.server_url, "http://frcvision.local");
        unsafe { std::env::remove_var("FRCVISION_SERVER_URL") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_interval() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FRCVISION_RECONNECT_MS", "soon") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.reconnect_interval_ms, 2000);

        unsafe { std::env::set_var("FRCVISION_RECONNECT_MS", "500") };
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.reconnect_interval_ms, 500);
        unsafe { std::env::remove_var("FRCVISION_RECONNECT_MS") };
    }
}
