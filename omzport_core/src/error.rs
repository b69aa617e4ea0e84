/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Omz-Port error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts carry paths, command lines and upstream API
    messages only; the updater holds no credentials.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Every failure in the update run is fatal; modules return
    these errors and the binary entry point maps them to exit
    codes.

  Revision History:
    2025-11-02 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Omz-Port operations.
pub type Result<T> = std::result::Result<T, PortError>;

/// Enumerates high-level error domains surfaced by the updater.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}")]
    CommandFailure { command: String, status: i32 },
    #[error("Plist output: {0}")]
    PlistOutput(String),
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Parse: {0}")]
    Parse(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PortError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            PortError::CommandMissing { .. } => 10,
            PortError::CommandFailure { .. } => 11,
            PortError::PlistOutput(_) => 12,
            PortError::Config(_) => 20,
            PortError::Parse(_) => 21,
            PortError::Network(_) => 30,
            PortError::Serialization(_) => 31,
            PortError::Filesystem(_) => 40,
            PortError::Io(_) => 41,
            PortError::Runtime(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable_and_non_zero() {
        let cases = [
            (
                PortError::CommandMissing {
                    command: "make".into(),
                },
                10,
            ),
            (
                PortError::CommandFailure {
                    command: "make clean".into(),
                    status: 2,
                },
                11,
            ),
            (PortError::PlistOutput("empty".into()), 12),
            (PortError::Config("x".into()), 20),
            (PortError::Parse("x".into()), 21),
            (PortError::Network("x".into()), 30),
            (PortError::Serialization("x".into()), 31),
            (PortError::Filesystem("x".into()), 40),
            (PortError::Io(io::Error::other("x")), 41),
            (PortError::Runtime("x".into()), 50),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code, "{err}");
        }
    }

    #[test]
    fn command_failure_names_the_command_line() {
        let err = PortError::CommandFailure {
            command: "make clean fetch makesum".into(),
            status: 2,
        };
        assert_eq!(
            err.to_string(),
            "Command `make clean fetch makesum` failed with status 2"
        );
    }
}
