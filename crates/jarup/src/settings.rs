use std::path::{Path, PathBuf};

use jarup_core::AppProfile;
use jarup_platform::AppPaths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub profile: Option<AppProfile>,

    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Application configuration directory removed by `purge`.
    #[serde(default)]
    pub config_dir: Option<PathBuf>,

    #[serde(default)]
    pub launcher_bin: Option<PathBuf>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_http_connect_timeout")]
    pub http_connect_timeout_secs: u64,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_install_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_http_timeout() -> u64 {
    30
}

fn default_http_connect_timeout() -> u64 {
    10
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            profile: None,
            install_root: default_install_root(),
            config_dir: None,
            launcher_bin: None,
            http_timeout_secs: default_http_timeout(),
            http_connect_timeout_secs: default_http_connect_timeout(),
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    /// Settings from the default location. Runs before logging is set up, so
    /// a file that had to be ignored is reported back for the caller to log.
    #[must_use]
    pub fn load() -> (Self, Option<String>) {
        let Ok(paths) = AppPaths::new() else {
            return (Self::default(), None);
        };
        Self::load_from_path(&paths.settings_file())
    }

    /// Missing or unparsable files yield the defaults. Only an unparsable file
    /// comes with a message.
    #[must_use]
    pub fn load_from_path(path: &Path) -> (Self, Option<String>) {
        let Ok(content) = std::fs::read_to_string(path) else {
            return (Self::default(), None);
        };
        match serde_json::from_str(&content) {
            Ok(settings) => (settings, None),
            Err(error) => (
                Self::default(),
                Some(format!("Ignoring invalid settings {}: {error}", path.display())),
            ),
        }
    }
}
