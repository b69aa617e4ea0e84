/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for the Omz-Port updater. Compares the latest
    ohmyzsh commit against the FreeBSD port Makefile and, when
    upstream is newer, refreshes and tests the port.

  Security / Safety Notes:
    Operates within user privileges. Executes make inside the
    port directory and performs one HTTPS GET request.

  Dependencies:
    clap for CLI parsing, chrono for session stamps.

  Operational Scope:
    Run by the port maintainer by hand or from cron against a
    checked-out ports tree.

  Revision History:
    2025-11-02 COD  Authored Omz-Port runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod build;
mod config;
mod error;
mod github;
mod logger;
mod makefile;
mod updater;
mod version;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use build::MakeTool;
use config::{PortPaths, Settings};
use error::Result;
use github::GithubClient;
use logger::{LogLevel, Logger};
use updater::{run_update, Outcome, RunOptions};

/// Command-line arguments for the Omz-Port updater.
#[derive(Debug, Parser)]
#[command(
    name = "omzport-updater",
    version,
    author = "Synavera Systems",
    about = "Keeps the ohmyzsh FreeBSD port in step with upstream master"
)]
struct Cli {
    /// Path to the ohmyzsh port directory.
    #[arg(long = "omz-port", value_name = "DIR")]
    omz_port: PathBuf,
    /// Force port update even if no new version is available.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
    /// Report versions and the decision without touching the port.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Omz-Port] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let paths = PortPaths::load(&cli.omz_port)?;
    let settings = Settings::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| {
        settings
            .log_dir()
            .map(|dir| dir.join(format!("update_{session_stamp}.log")))
    });
    let logger = Logger::new(log_path, cli.verbose)?;
    logger.debug(
        "INIT",
        format!("Port directory {}", paths.port_dir.display()),
    );

    let upstream = GithubClient::new(&settings.github)?;
    let tool = MakeTool::new(settings.build.command.as_str(), &paths.port_dir);
    logger.debug(
        "INIT",
        format!(
            "Build tool `{}` in {}",
            settings.build.command,
            tool.port_dir().display()
        ),
    );

    let options = RunOptions {
        force: cli.force,
        dry_run: cli.dry_run,
    };

    let result = run_update(&paths, options, &upstream, &tool, &logger).await;
    conclude(&logger, result)?;

    Ok(ExitCode::SUCCESS)
}

/// Close out the session log; the run's own error takes precedence.
///
/// Failures are recorded in the log file only, since `main` prints them.
fn conclude(logger: &Logger, result: Result<Outcome>) -> Result<Outcome> {
    match &result {
        Ok(outcome) => logger.info("SUMMARY", format!("outcome={}", outcome.as_str())),
        Err(err) => logger.record(LogLevel::Error, "ABORT", err.to_string()),
    }
    let finalized = logger.finalize();
    let outcome = result?;
    finalized?;
    Ok(outcome)
}
