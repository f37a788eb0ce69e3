//! `~/.patungan/config.toml`
//!
//! ```toml
//! [session]
//! people = 3          # starting head count (1-20)
//! show_names = true   # open with the name editor visible
//!
//! [share]
//! command = ["wl-copy"]   # receives the share text on stdin
//! timeout_secs = 30
//!
//! [print]
//! command = ["lpr", "-P", "receipt"]
//! timeout_secs = 60
//! ```
//!
//! Every section is optional; a missing file means defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatunganConfig {
    pub session: Option<SessionConfig>,
    pub share: Option<ShareConfig>,
    pub print: Option<PrintConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub people: Option<usize>,
    #[serde(default)]
    pub show_names: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareConfig {
    pub command: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrintConfig {
    pub command: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl PatunganConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    pub fn initial_people(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.people)
    }

    pub fn show_names(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.show_names)
    }

    pub fn share_command(&self) -> Option<Vec<String>> {
        self.share.as_ref().and_then(|s| s.command.clone())
    }

    pub fn print_command(&self) -> Vec<String> {
        self.print
            .as_ref()
            .and_then(|p| p.command.clone())
            .unwrap_or_else(|| vec!["lpr".to_string()])
    }

    pub fn share_timeout(&self) -> Duration {
        let secs = self.share.as_ref().and_then(|s| s.timeout_secs);
        Duration::from_secs(secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn print_timeout(&self) -> Duration {
        let secs = self.print.as_ref().and_then(|p| p.timeout_secs);
        Duration::from_secs(secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".patungan").join("config.toml"))
}
