/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared version metadata for the upstream commit and the
    local port, plus the update decision derived from them.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    chrono for calendar date extraction.

  Operational Scope:
    Produced by the GitHub client and the Makefile reader,
    consumed by the update workflow and the rewriter.

  Revision History:
    2025-11-02 COD  Introduced date-ordered VersionInfo.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Integer ordering surrogate instead of ad-hoc date maths
============================================================*/

use std::fmt;

use chrono::Datelike;

/// Version metadata for one side of the comparison.
///
/// `numeric_date` is `year * 10000 + month * 100 + day`. `identifier` is a
/// commit SHA upstream and a tag name locally; only the dates are compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub numeric_date: u32,
    pub identifier: String,
}

impl VersionInfo {
    pub fn new(numeric_date: u32, identifier: impl Into<String>) -> Self {
        Self {
            numeric_date,
            identifier: identifier.into(),
        }
    }

    /// Build from any calendar date, e.g. a UTC commit timestamp.
    pub fn from_date<D: Datelike>(date: &D, identifier: impl Into<String>) -> Self {
        Self::new(numeric_date(date), identifier)
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "date: {}, sha: {}", self.numeric_date, self.identifier)
    }
}

/// Encode a calendar date as `YYYYMMDD`.
pub fn numeric_date<D: Datelike>(date: &D) -> u32 {
    // Years before 1 CE do not occur in commit metadata.
    let year = date.year().max(0) as u32;
    year * 10_000 + date.month() * 100 + date.day()
}

/// True iff the remote version is strictly newer than the local one.
pub fn update_required(remote: &VersionInfo, local: &VersionInfo) -> bool {
    remote.numeric_date > local.numeric_date
}

/// What the workflow does after comparing versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Upstream is newer.
    Required,
    /// Upstream is not newer but `--force` was given.
    Forced,
    /// Nothing to do.
    NotRequired,
}

impl Decision {
    pub fn evaluate(remote: &VersionInfo, local: &VersionInfo, force: bool) -> Self {
        if update_required(remote, local) {
            Decision::Required
        } else if force {
            Decision::Forced
        } else {
            Decision::NotRequired
        }
    }

    pub fn proceeds(self) -> bool {
        !matches!(self, Decision::NotRequired)
    }
}
