#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Extraction of [`Record`]s from raw GitHub pages.
//!
//! Parsing never fails as a whole. Entries that cannot be read are skipped and
//! counted, entries outside the configured window are dropped and counted.

mod discovery;

use ghactivity_activity_models::{CrawlConfig, Record};
use ghactivity_github_models::{GithubCommitItem, GithubIssueItem};
use ghactivity_source_models::{Feed, Page};

pub use discovery::{entry_count, oldest_timestamp, parse_repository_names};

/// Why a single entry was skipped.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The entry does not have the expected shape.
    #[error("Malformed entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search result #{number} is not a pull request")]
    NotAPullRequest { number: u64 },

    #[error("Cannot derive a repository from '{url}'")]
    RepositoryUrl { url: String },

    #[error("Commit {sha} has no author or committer date")]
    MissingTimestamp { sha: String },
}

/// Outcome of parsing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub records: Vec<Record>,
    /// Malformed entries.
    pub skipped: usize,
    /// Well-formed entries whose timestamp is outside the window.
    pub out_of_window: usize,
}

/// Parse every entry of `page` into records attributed to the configured user.
///
/// Repository listing pages never produce records.
#[must_use]
pub fn parse_page(page: &Page, config: &CrawlConfig) -> ParsedPage {
    let username = config.username();

    match &page.feed {
        Feed::PullRequests { .. } => collect(page, config, |entry| {
            parse_pull_request(entry, username)
        }),
        Feed::Commits { repository, .. } => collect(page, config, |entry| {
            parse_commit(entry, repository, username)
        }),
        Feed::Repositories { .. } => ParsedPage::default(),
    }
}

fn collect(
    page: &Page,
    config: &CrawlConfig,
    parse: impl Fn(&serde_json::Value) -> Result<Record, ParseError>,
) -> ParsedPage {
    let mut parsed = ParsedPage::default();

    for entry in discovery::entries(page) {
        match parse(entry) {
            Ok(record) if config.window().contains(&record.timestamp) => {
                parsed.records.push(record);
            }
            Ok(record) => {
                log::trace!(
                    "Dropping {} {} at {}: outside window",
                    record.kind,
                    record.identifier,
                    record.timestamp
                );
                parsed.out_of_window += 1;
            }
            Err(e) => {
                log::warn!("Skipping entry on page {} of {}: {e}", page.number, page.feed);
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

fn parse_pull_request(entry: &serde_json::Value, username: &str) -> Result<Record, ParseError> {
    let item: GithubIssueItem = serde_json::from_value(entry.clone())?;

    if item.pull_request.is_none() {
        return Err(ParseError::NotAPullRequest {
            number: item.number,
        });
    }

    let (owner, name) = item
        .repository_parts()
        .ok_or_else(|| ParseError::RepositoryUrl {
            url: item.repository_url.clone(),
        })?;

    Ok(Record::pull_request(
        name,
        organization(owner, username),
        item.created_at,
        item.number,
        username,
    ))
}

fn parse_commit(
    entry: &serde_json::Value,
    full_name: &str,
    username: &str,
) -> Result<Record, ParseError> {
    let item: GithubCommitItem = serde_json::from_value(entry.clone())?;
    let timestamp = item
        .timestamp()
        .ok_or_else(|| ParseError::MissingTimestamp {
            sha: item.sha.clone(),
        })?;

    let (owner, name) = full_name
        .split_once('/')
        .map_or((None, full_name), |(owner, name)| (Some(owner), name));

    Ok(Record::commit(
        name,
        owner.and_then(|owner| organization(owner, username)),
        timestamp,
        item.sha,
        username,
    ))
}

/// The owner counts as an organization only when it is not the user themselves.
fn organization(owner: &str, username: &str) -> Option<String> {
    if owner.eq_ignore_ascii_case(username) {
        None
    } else {
        Some(owner.to_string())
    }
}
