#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct GithubUser {
    pub login: String,
}

/// A search result item. Pull requests carry a `pull_request` object.
#[derive(Debug, Deserialize, Serialize)]
pub struct GithubIssueItem {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    /// e.g. `https://api.github.com/repos/o1/r1`
    pub repository_url: String,
    pub pull_request: Option<serde_json::Value>,
    pub user: Option<GithubUser>,
}

impl GithubIssueItem {
    /// Owner and name taken from the last two segments of `repository_url`.
    #[must_use]
    pub fn repository_parts(&self) -> Option<(&str, &str)> {
        let mut segments = self
            .repository_url
            .trim_end_matches('/')
            .rsplit('/')
            .filter(|s| !s.is_empty());
        let name = segments.next()?;
        let owner = segments.next()?;
        Some((owner, name))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GithubSignature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GithubCommitDetail {
    pub author: Option<GithubSignature>,
    pub committer: Option<GithubSignature>,
    #[serde(default)]
    pub message: String,
}

/// An entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize, Serialize)]
pub struct GithubCommitItem {
    pub sha: String,
    pub commit: GithubCommitDetail,
}

impl GithubCommitItem {
    /// Author date, falling back to the committer date.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.commit
            .author
            .as_ref()
            .and_then(|a| a.date)
            .or_else(|| self.commit.committer.as_ref().and_then(|c| c.date))
    }

    /// Committer date, falling back to the author date. Commit listings are
    /// ordered and filtered by this date.
    #[must_use]
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .and_then(|c| c.date)
            .or_else(|| self.commit.author.as_ref().and_then(|a| a.date))
    }
}

/// An entry of `GET /users/{user}/repos`.
#[derive(Debug, Deserialize, Serialize)]
pub struct GithubRepositoryItem {
    pub name: String,
    pub full_name: String,
    pub owner: GithubUser,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub size: u64,
}
