/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Provide the progress trace printed before each update step
    and an append-only session log for later audit.

  Security / Safety Notes:
    Entries contain port paths, versions and command lines only.

  Dependencies:
    std::fs::File, std::sync::Mutex, sha2 for integrity hashing.

  Operational Scope:
    Used by every stage of the update run to emit RFC-3339 UTC
    stamped entries and produce a session hash digest.

  Revision History:
    2025-11-02 COD  Adapted Synavera logger for port updates.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{PortError, Result};

/// Structured log level for updater events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        })
    }
}

fn format_entry(level: LogLevel, code: &str, message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!("{timestamp} [{level}] [{code}] {message}")
}

/// Progress trace on stderr plus an optional append-only session log.
pub struct Logger {
    file: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger that writes to stderr and optionally to a file.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let file = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_log(file_path)?))),
            None => None,
        };
        Ok(Self {
            file,
            path,
            verbose,
        })
    }

    /// Whether an entry of `level` reaches stderr.
    fn echoes(&self, level: LogLevel) -> bool {
        level != LogLevel::Debug || self.verbose
    }

    /// Emit an entry to stderr (subject to verbosity) and the session log.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let entry = format_entry(level, code, message.as_ref());
        if self.echoes(level) {
            eprintln!("{entry}");
        }
        self.append(&entry);
    }

    /// Write an entry to the session log only.
    pub fn record<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        self.append(&format_entry(level, code, message.as_ref()));
    }

    fn append(&self, entry: &str) {
        let Some(file) = &self.file else { return };
        let Ok(mut guard) = file.lock() else { return };
        if let Err(err) = writeln!(guard, "{entry}").and_then(|_| guard.flush()) {
            eprintln!(
                "{}",
                format_entry(
                    LogLevel::Warn,
                    "LOGGER",
                    &format!("Failed to write log file: {err}")
                )
            );
        }
    }

    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write `<log>.hash` holding the SHA-256 of the session log.
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                guard.flush()?;
            }
        }
        let data = std::fs::read(path).map_err(|err| {
            PortError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let line = format!(
            "{:x}  {}\n",
            Sha256::digest(&data),
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        std::fs::write(&hash_path, line).map_err(|err| {
            PortError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })
    }
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            PortError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| {
            PortError::Filesystem(format!("Failed to open log file {}: {err}", path.display()))
        })
}
