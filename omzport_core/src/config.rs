/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Resolve the port directory into the three managed files
    and load optional operator settings from TOML.

  Security / Safety Notes:
    Settings are read from operator-owned paths only. The
    upstream repository identity is compiled in and cannot be
    redirected through configuration.

  Dependencies:
    serde + toml for settings, dirs for default locations.

  Operational Scope:
    Constructed once at startup and passed by reference to
    every stage of the update run.

  Revision History:
    2025-11-02 COD  Authored port path and settings loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Validate before acting; no partial configuration
    - Explicit defaults for every setting
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PortError, Result};

pub const MAKEFILE_NAME: &str = "Makefile";
pub const DISTINFO_NAME: &str = "distinfo";
pub const PLIST_NAME: &str = "pkg-plist";

const APP_DIR: &str = "omzport";
const CONFIG_FILE: &str = "config.toml";

/// The port directory and the three files the updater manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPaths {
    pub port_dir: PathBuf,
    pub makefile: PathBuf,
    pub distinfo: PathBuf,
    pub plist: PathBuf,
}

impl PortPaths {
    /// Derive the managed file paths without touching the filesystem.
    pub fn new(port_dir: impl Into<PathBuf>) -> Self {
        let port_dir = port_dir.into();
        Self {
            makefile: port_dir.join(MAKEFILE_NAME),
            distinfo: port_dir.join(DISTINFO_NAME),
            plist: port_dir.join(PLIST_NAME),
            port_dir,
        }
    }

    /// Derive and validate the managed file paths.
    pub fn load(port_dir: impl Into<PathBuf>) -> Result<Self> {
        let paths = Self::new(port_dir);
        paths.validate()?;
        Ok(paths)
    }

    /// Every managed path must exist and be a regular file.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.makefile, &self.distinfo, &self.plist] {
            let metadata = std::fs::metadata(path).map_err(|err| {
                PortError::Config(format!("Cannot stat {}: {err}", path.display()))
            })?;
            if metadata.is_dir() {
                return Err(PortError::Config(format!(
                    "{} is a directory, and it must be a file. Please check your omz-port parameter",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Operator settings loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub github: GithubConfig,
    pub build: BuildConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub api_url: String,
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            user_agent: concat!("Omz-Port-Updater/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub command: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: "make".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from an explicit path, or the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::load(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            PortError::Config(format!("Failed to read settings {}: {err}", path.display()))
        })?;
        Self::parse(&raw)
            .map_err(|err| PortError::Config(format!("Invalid settings {}: {err}", path.display())))
    }

    fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `$XDG_CONFIG_HOME/omzport/config.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Directory for session logs, if one can be resolved.
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging.dir.clone().or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .map(|dir| dir.join(APP_DIR).join("logs"))
        })
    }
}
