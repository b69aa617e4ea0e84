/*============================================================
  Synavera Project: Omz-Port
  Module: omzport_core::github
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Query the GitHub REST API for the latest ohmyzsh commit on
    master and derive the upstream VersionInfo from it.

  Security / Safety Notes:
    Performs one anonymous, read-only HTTPS request per run.
    No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, serde for response parsing, chrono for
    commit timestamps.

  Operational Scope:
    Supplies the upstream side of the version comparison.

  Revision History:
    2025-11-02 COD  Implemented GitHub commit client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Single request, no retry; failures surface verbatim
    - Structured response parsing with explicit error paths
============================================================*/

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use urlencoding::encode;

use crate::config::GithubConfig;
use crate::error::{PortError, Result};
use crate::version::VersionInfo;

pub const UPSTREAM_OWNER: &str = "ohmyzsh";
pub const UPSTREAM_REPO: &str = "ohmyzsh";
pub const UPSTREAM_BRANCH: &str = "master";

/// Something that can report the newest upstream version.
pub trait UpstreamSource {
    async fn latest_version(&self) -> Result<VersionInfo>;
}

/// Anonymous client for the GitHub commits endpoint.
#[derive(Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    /// Construct a new client from configuration.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| PortError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn compose_url(&self, owner: &str, repo: &str, reference: &str) -> String {
        format!(
            "{}/repos/{}/{}/commits/{}",
            self.base_url,
            encode(owner),
            encode(repo),
            encode(reference)
        )
    }

    /// Fetch the head commit of `reference` in `owner/repo`.
    async fn fetch_commit(&self, owner: &str, repo: &str, reference: &str) -> Result<CommitResponse> {
        let url = self.compose_url(owner, repo, reference);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|err| PortError::Network(format!("GitHub request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|err| err.message)
                .unwrap_or(body);
            return Err(PortError::Network(format!(
                "GitHub responded with {status} for {url}: {}",
                detail.trim()
            )));
        }

        response.json::<CommitResponse>().await.map_err(|err| {
            PortError::Serialization(format!("Failed to decode GitHub commit response: {err}"))
        })
    }
}

impl UpstreamSource for GithubClient {
    async fn latest_version(&self) -> Result<VersionInfo> {
        let commit = self
            .fetch_commit(UPSTREAM_OWNER, UPSTREAM_REPO, UPSTREAM_BRANCH)
            .await?;
        commit.version_info()
    }
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl CommitResponse {
    fn version_info(&self) -> Result<VersionInfo> {
        if self.sha.trim().is_empty() {
            return Err(PortError::Serialization(
                "GitHub commit response carries an empty sha".into(),
            ));
        }
        let raw_date = self
            .commit
            .committer
            .as_ref()
            .and_then(|committer| committer.date.as_deref())
            .ok_or_else(|| {
                PortError::Serialization(format!(
                    "GitHub commit {} has no committer date",
                    self.sha
                ))
            })?;
        let date = DateTime::parse_from_rfc3339(raw_date)
            .map_err(|err| {
                PortError::Serialization(format!("Invalid committer date `{raw_date}`: {err}"))
            })?
            .with_timezone(&Utc);
        Ok(VersionInfo::from_date(&date, self.sha.as_str()))
    }
}
