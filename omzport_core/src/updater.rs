/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::updater
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Compare upstream and local versions and, when required,
    rewrite the Makefile and rebuild the derived port files.

  Security / Safety Notes:
    Mutates only the three managed files in the port directory.
    No rollback is attempted; a failed run leaves edits in place.

  Dependencies:
    Internal modules only.

  Operational Scope:
    Invoked once per process by the binary entry point.

  Revision History:
    2025-11-02 COD  Authored linear update workflow.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Progress trace before every step
    - First failure aborts; reruns are safe because the
      comparison is idempotent
============================================================*/

use crate::build::{regenerate_port, BuildTool};
use crate::config::PortPaths;
use crate::error::Result;
use crate::github::UpstreamSource;
use crate::logger::Logger;
use crate::makefile::{local_version, read_makefile, rewrite, write_makefile};
use crate::version::Decision;

/// Flags that steer a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub force: bool,
    pub dry_run: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    UpToDate,
    DryRun,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Updated => "updated",
            Outcome::UpToDate => "up-to-date",
            Outcome::DryRun => "dry-run",
        }
    }
}

/// Bring the port in line with upstream.
pub async fn run_update<S, B>(
    paths: &PortPaths,
    options: RunOptions,
    upstream: &S,
    tool: &B,
    logger: &Logger,
) -> Result<Outcome>
where
    S: UpstreamSource,
    B: BuildTool,
{
    logger.info("UPSTREAM", "Checking upstream version");
    let remote = upstream.latest_version().await?;

    logger.info("MAKEFILE", "Reading Makefile");
    let makefile = read_makefile(&paths.makefile)?;
    logger.info("LOCAL", "Checking local version");
    let local = local_version(&makefile)?;

    logger.info("UPSTREAM", format!("Upstream:\t{remote}"));
    logger.info("LOCAL", format!("Local:\t{local}"));

    match Decision::evaluate(&remote, &local, options.force) {
        Decision::Required => logger.info("DECISION", "Update is required"),
        Decision::Forced => logger.warn(
            "DECISION",
            "Update is NOT required, continuing anyway because of --force",
        ),
        Decision::NotRequired => {
            logger.info("DECISION", "Update is NOT required, exiting");
            return Ok(Outcome::UpToDate);
        }
    }

    if options.dry_run {
        logger.info("DRYRUN", "Dry run requested; port left untouched");
        return Ok(Outcome::DryRun);
    }

    logger.info("MAKEFILE", "Writing modified Makefile");
    write_makefile(&paths.makefile, &rewrite(&makefile, &remote))?;

    regenerate_port(tool, paths, logger).await?;

    logger.info("COMPLETE", "All done");
    Ok(Outcome::Updated)
}
