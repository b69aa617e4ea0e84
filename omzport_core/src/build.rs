/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::build
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Drive the ports build tool inside the port directory to
    regenerate distinfo and pkg-plist and to test the result.

  Security / Safety Notes:
    Executes the configured make binary with user privileges
    and a fixed target vocabulary; no privilege escalation is
    attempted.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Entered only after the Makefile has been rewritten.

  Revision History:
    2025-11-02 COD  Crafted ports build-tool integration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Fixed step order; first failure aborts the run
    - Reusable helpers for external command diagnostics
============================================================*/

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::PortPaths;
use crate::error::{PortError, Result};
use crate::logger::Logger;

pub const MAKESUM_TARGETS: &[&str] = &["clean", "fetch", "makesum"];
pub const STAGE_TARGETS: &[&str] = &["stage"];
pub const MAKEPLIST_TARGETS: &[&str] = &["makeplist"];
pub const TEST_TARGETS: &[&str] = &["clean", "stage", "stage-qa", "check-plist", "package"];
pub const CLEAN_TARGETS: &[&str] = &["clean"];

/// A build tool that runs targets inside the port directory.
pub trait BuildTool {
    /// Run targets with inherited stdio; non-zero exit is an error.
    async fn run(&self, targets: &[&str]) -> Result<()>;

    /// Run targets and return their captured stdout.
    async fn capture(&self, targets: &[&str]) -> Result<Vec<u8>>;
}

/// The ports `make`, pinned to one port directory.
#[derive(Debug, Clone)]
pub struct MakeTool {
    program: String,
    port_dir: PathBuf,
}

impl MakeTool {
    pub fn new(program: impl Into<String>, port_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            port_dir: port_dir.into(),
        }
    }

    pub fn port_dir(&self) -> &Path {
        &self.port_dir
    }

    fn command(&self, targets: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(targets).current_dir(&self.port_dir);
        cmd
    }

    fn command_line(&self, targets: &[&str]) -> String {
        let mut line = self.program.clone();
        for target in targets {
            line.push(' ');
            line.push_str(target);
        }
        line
    }

    fn check_status(&self, targets: &[&str], status: std::process::ExitStatus) -> Result<()> {
        if status.success() {
            Ok(())
        } else {
            Err(PortError::CommandFailure {
                command: self.command_line(targets),
                status: status.code().unwrap_or(-1),
            })
        }
    }
}

impl BuildTool for MakeTool {
    async fn run(&self, targets: &[&str]) -> Result<()> {
        let status = self
            .command(targets)
            .status()
            .await
            .map_err(|err| map_spawn_error(err, &self.program))?;
        self.check_status(targets, status)
    }

    async fn capture(&self, targets: &[&str]) -> Result<Vec<u8>> {
        let output = self
            .command(targets)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|err| map_spawn_error(err, &self.program))?;
        self.check_status(targets, output.status)?;
        Ok(output.stdout)
    }
}

/// Drop the advisory first line `makeplist` prints ahead of the list.
pub fn strip_advisory_line(output: &[u8]) -> Result<&[u8]> {
    match output.iter().position(|&byte| byte == b'\n') {
        Some(idx) => Ok(&output[idx + 1..]),
        None if output.is_empty() => Err(PortError::PlistOutput(
            "makeplist produced no output".into(),
        )),
        None => Err(PortError::PlistOutput(
            "makeplist output has no line after the advisory header".into(),
        )),
    }
}

/// Regenerate distinfo and pkg-plist, then test and clean the port.
pub async fn regenerate_port<B: BuildTool>(
    tool: &B,
    paths: &PortPaths,
    logger: &Logger,
) -> Result<()> {
    logger.info("DISTINFO", "Re-creating distinfo");
    std::fs::remove_file(&paths.distinfo).map_err(|err| {
        PortError::Filesystem(format!(
            "Failed to remove {}: {err}",
            paths.distinfo.display()
        ))
    })?;
    tool.run(MAKESUM_TARGETS).await?;

    logger.info("PLIST", "Re-creating plist");
    tool.run(STAGE_TARGETS).await?;
    let output = tool.capture(MAKEPLIST_TARGETS).await?;
    let plist = strip_advisory_line(&output)?;
    logger.debug(
        "PLIST",
        format!("Writing {} bytes to {}", plist.len(), paths.plist.display()),
    );
    std::fs::write(&paths.plist, plist).map_err(|err| {
        PortError::Filesystem(format!("Failed to write {}: {err}", paths.plist.display()))
    })?;

    logger.info("TEST", "Testing port");
    tool.run(TEST_TARGETS).await?;
    tool.run(CLEAN_TARGETS).await?;
    Ok(())
}

fn map_spawn_error(err: io::Error, command: &str) -> PortError {
    if err.kind() == io::ErrorKind::NotFound {
        PortError::CommandMissing {
            command: command.into(),
        }
    } else {
        PortError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records every invocation and answers `makeplist` with canned output.
    #[derive(Default)]
    pub struct RecordingTool {
        pub calls: RefCell<Vec<Vec<String>>>,
        pub plist_output: Vec<u8>,
        pub fail_on: Option<&'static [&'static str]>,
    }

    impl RecordingTool {
        pub fn with_plist(output: &[u8]) -> Self {
            Self {
                plist_output: output.to_vec(),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }

        fn record(&self, targets: &[&str]) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(targets.iter().map(|t| t.to_string()).collect());
            if self.fail_on.is_some_and(|fail| fail == targets) {
                return Err(PortError::CommandFailure {
                    command: format!("make {}", targets.join(" ")),
                    status: 1,
                });
            }
            Ok(())
        }
    }

    impl BuildTool for RecordingTool {
        async fn run(&self, targets: &[&str]) -> Result<()> {
            self.record(targets)
        }

        async fn capture(&self, targets: &[&str]) -> Result<Vec<u8>> {
            self.record(targets)?;
            Ok(self.plist_output.clone())
        }
    }

    pub fn expected_sequence() -> Vec<Vec<String>> {
        [
            MAKESUM_TARGETS,
            STAGE_TARGETS,
            MAKEPLIST_TARGETS,
            TEST_TARGETS,
            CLEAN_TARGETS,
        ]
        .iter()
        .map(|targets| targets.iter().map(|t| t.to_string()).collect())
        .collect()
    }
}
