use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file contents. Every key is optional; a missing file is the
/// same as an empty one.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL, used when neither `--endpoint` nor
    /// `JOKEBOX_ENDPOINT` is given
    pub endpoint: Option<String>,
    /// Transcript file every generated joke is appended to
    pub log_file: Option<String>,
}

/// Keys accepted by `jokebox set` / `jokebox unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    LogFile,
}

impl ConfigKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "endpoint" => Some(ConfigKey::Endpoint),
            "log-file" => Some(ConfigKey::LogFile),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::LogFile => "log-file",
        }
    }
}

impl Config {
    pub fn set(&mut self, key: ConfigKey, value: String) {
        match key {
            ConfigKey::Endpoint => self.endpoint = Some(value),
            ConfigKey::LogFile => self.log_file = Some(value),
        }
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::LogFile => self.log_file = None,
        }
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::Endpoint => self.endpoint.as_deref(),
            ConfigKey::LogFile => self.log_file.as_deref(),
        }
    }
}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
