//! GitHub-commit based update checks.
//!
//! Version numbers are ignored. The latest commit touching the extension's
//! path on the configured branch is compared with the commit recorded at
//! install time; a different sha means the files changed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use narrator_core::Settings;
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::client::ensure_success;
use crate::error::{ProviderError, ProviderResult};

/// Name the host application knows the extension by.
pub const DEFAULT_EXTENSION_NAME: &str = "narrator";

const GITHUB_API: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// `owner/repo` on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Accepts `owner/repo`, `https://github.com/owner/repo(.git)` and
/// `git@github.com:owner/repo.git`.
#[must_use]
pub fn normalize_repo(input: &str) -> Option<RepoRef> {
    let mut s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(rest) = s.strip_prefix("git@github.com:") {
        s = rest;
    }
    for prefix in ["https://github.com/", "http://github.com/"] {
        if s.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix)) {
            s = &s[prefix.len()..];
            break;
        }
    }
    let suffix_at = s.len().saturating_sub(4);
    if s.get(suffix_at..).is_some_and(|tail| tail.eq_ignore_ascii_case(".git")) {
        s = &s[..suffix_at];
    }
    let s = s.trim_end_matches('/');

    let mut parts = s.split('/');
    let owner = parts.next().filter(|p| !p.is_empty())?;
    let repo = parts.next().filter(|p| !p.is_empty())?;
    Some(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Whether an automatic check is due.
#[must_use]
pub fn should_auto_check(
    now: DateTime<Utc>,
    last: Option<DateTime<Utc>>,
    interval_hours: u32,
) -> bool {
    last.is_none_or(|last| now - last >= Duration::hours(i64::from(interval_hours.max(1))))
}

/// Result of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    NoRepository,
    /// Automatic checks are on and the interval has not elapsed.
    Skipped,
    /// First check: the remote commit became the installed baseline.
    Initialized { remote: String },
    UpToDate { remote: String },
    UpdateAvailable { local: String, remote: String },
}

impl UpdateOutcome {
    #[must_use]
    pub const fn has_update(&self) -> bool {
        matches!(self, Self::UpdateAvailable { .. })
    }
}

/// Where the latest commit sha comes from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Latest commit on `branch` touching `path` (whole repository when
    /// `path` is empty).
    async fn latest_commit_sha(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> ProviderResult<String>;
}

/// Asks the host application to update the installed extension.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtensionInstaller: Send + Sync {
    async fn install(&self, extension_name: &str) -> ProviderResult<()>;
}

/// [`CommitSource`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubCommits {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubCommits {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_api_base(http, GITHUB_API)
    }

    #[must_use]
    pub fn with_api_base(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn commits_url(&self, repo: &RepoRef, branch: &str, path: &str) -> ProviderResult<Url> {
        let mut url = Url::parse(&format!(
            "{}/repos/{}/{}/commits",
            self.api_base, repo.owner, repo.repo
        ))?;
        {
            let mut query = url.query_pairs_mut();
            if !branch.is_empty() {
                query.append_pair("sha", branch);
            }
            if !path.is_empty() {
                query.append_pair("path", path);
            }
            query.append_pair("per_page", "1");
        }
        Ok(url)
    }
}

#[async_trait]
impl CommitSource for GitHubCommits {
    async fn latest_commit_sha(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> ProviderResult<String> {
        let url = self.commits_url(repo, branch, path)?;
        debug!(%url, "Fetching latest commit");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;
        let list: Value = ensure_success(response).await?.json().await?;

        list.get(0)
            .and_then(|c| c.get("sha"))
            .and_then(Value::as_str)
            .filter(|sha| !sha.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::NoCommit)
    }
}

/// [`ExtensionInstaller`] calling the host's `/api/extensions/update`.
#[derive(Debug, Clone)]
pub struct HostInstaller {
    http: reqwest::Client,
    host_url: String,
}

impl HostInstaller {
    #[must_use]
    pub fn new(http: reqwest::Client, host_url: impl Into<String>) -> Self {
        Self {
            http,
            host_url: host_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ExtensionInstaller for HostInstaller {
    async fn install(&self, extension_name: &str) -> ProviderResult<()> {
        let response = self
            .http
            .post(format!("{}/api/extensions/update", self.host_url))
            .json(&json!({ "extensionName": extension_name, "global": true }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Runs update checks and applies updates, recording bookkeeping in
/// [`Settings`]. Persisting the settings is up to the caller.
pub struct UpdateChecker<S, I> {
    source: S,
    installer: I,
    extension_name: String,
}

impl UpdateChecker<GitHubCommits, HostInstaller> {
    /// Checker wired to GitHub and the configured host.
    #[must_use]
    pub fn from_settings(http: &reqwest::Client, settings: &Settings) -> Self {
        Self::new(
            GitHubCommits::new(http.clone()),
            HostInstaller::new(http.clone(), settings.host_url.clone()),
        )
    }
}

impl<S: CommitSource, I: ExtensionInstaller> UpdateChecker<S, I> {
    pub fn new(source: S, installer: I) -> Self {
        Self {
            source,
            installer,
            extension_name: DEFAULT_EXTENSION_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_extension_name(mut self, name: impl Into<String>) -> Self {
        self.extension_name = name.into();
        self
    }

    /// Compare the remote commit with the installed one.
    ///
    /// Unless `force` is set, a check with automatic checking enabled is
    /// skipped while the interval has not elapsed.
    pub async fn check(
        &self,
        settings: &mut Settings,
        force: bool,
        now: DateTime<Utc>,
    ) -> ProviderResult<UpdateOutcome> {
        let Some(repo) = settings.github_repo.as_deref().and_then(normalize_repo) else {
            return Ok(UpdateOutcome::NoRepository);
        };

        if !force
            && settings.auto_check_updates
            && !should_auto_check(
                now,
                settings.last_auto_check_at,
                settings.update_check_interval_hours,
            )
        {
            debug!("Update check not due");
            return Ok(UpdateOutcome::Skipped);
        }

        let branch = settings.github_branch.trim();
        let branch = if branch.is_empty() { "main" } else { branch };
        let path = settings.github_path.as_deref().unwrap_or_default().trim();
        let remote = self.source.latest_commit_sha(&repo, branch, path).await?;

        settings.last_auto_check_at = Some(now);
        settings.last_remote_commit = Some(remote.clone());

        let local = settings
            .last_installed_commit
            .clone()
            .filter(|sha| !sha.is_empty());
        let outcome = match local {
            None => {
                settings.last_installed_commit = Some(remote.clone());
                info!(remote = %short_sha(&remote), "Initialized update baseline");
                UpdateOutcome::Initialized { remote }
            }
            Some(local) if local == remote => UpdateOutcome::UpToDate { remote },
            Some(local) => {
                info!(
                    local = %short_sha(&local),
                    remote = %short_sha(&remote),
                    "Update available"
                );
                UpdateOutcome::UpdateAvailable { local, remote }
            }
        };
        Ok(outcome)
    }

    /// Ask the host to update the extension, then record `remote_sha` as
    /// installed.
    pub async fn perform_update(
        &self,
        settings: &mut Settings,
        remote_sha: &str,
    ) -> ProviderResult<()> {
        self.installer.install(&self.extension_name).await?;
        if !remote_sha.is_empty() {
            settings.last_installed_commit = Some(remote_sha.to_string());
        }
        info!(extension = %self.extension_name, "Extension updated");
        Ok(())
    }
}

/// First seven characters, as git prints them.
#[must_use]
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
