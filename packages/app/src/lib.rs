#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The `ghactivity` pipeline: fetch pages, parse records, write CSV, summarize.

pub mod cli;
mod report;

use std::path::{Path, PathBuf};

use ghactivity_activity_models::{ConfigError, Record};
use ghactivity_aggregate::{Summary, aggregate};
use ghactivity_fetcher::{FetchError, Fetcher};
use ghactivity_parser::parse_page;
use ghactivity_source::ActivitySource;
use ghactivity_writer::{WriterError, read_records, write_records};

pub use report::{SummaryReport, summary_json};

/// Exit code for invalid command line input (`EX_USAGE`).
pub const EXIT_CONFIG: u8 = 64;

/// Exit code for rejected credentials. Distinct from clap's usage error code 2.
pub const EXIT_AUTH: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriterError),

    #[error("Failed to encode summary")]
    Encode(#[from] serde_json::Error),
}

impl CrawlError {
    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Fetch(FetchError::Auth { .. }) => EXIT_AUTH,
            Self::Fetch(FetchError::RateLimit { .. }) => 3,
            Self::Fetch(FetchError::Network { .. } | FetchError::Source { .. })
            | Self::Encode(_) => 1,
            Self::Write(_) => 4,
        }
    }
}

/// Records gathered by one crawl, before they are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub records: Vec<Record>,
    pub pages: usize,
    pub skipped: usize,
    pub out_of_window: usize,
}

/// Outcome of a successful crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub output: PathBuf,
    pub written: usize,
    pub pages: usize,
    pub skipped: usize,
    pub out_of_window: usize,
    pub summary: Summary,
}

/// Run the fetcher to completion and parse every page it yields.
///
/// # Errors
///
/// * If the fetcher fails, see [`FetchError`]
pub async fn collect_records<S: ActivitySource>(
    fetcher: &Fetcher<S>,
) -> Result<Collected, FetchError> {
    let mut collected = Collected::default();
    let mut cursor = fetcher.pages();

    while let Some(page) = cursor.next_page().await? {
        let parsed = parse_page(&page, fetcher.config());
        log::debug!(
            "Page {} of {}: {} records, {} skipped, {} outside window",
            page.number,
            page.feed,
            parsed.records.len(),
            parsed.skipped,
            parsed.out_of_window
        );

        collected.pages += 1;
        collected.skipped += parsed.skipped;
        collected.out_of_window += parsed.out_of_window;
        collected.records.extend(parsed.records);
    }

    if collected.skipped > 0 {
        log::warn!("Skipped {} malformed entries", collected.skipped);
    }

    Ok(collected)
}

/// Crawl everything, then write the records newest first to `output`.
///
/// Nothing is written unless the whole crawl succeeds.
///
/// # Errors
///
/// * If the crawl fails
/// * If `output` cannot be written
pub async fn crawl<S: ActivitySource>(
    fetcher: &Fetcher<S>,
    output: &Path,
) -> Result<CrawlReport, CrawlError> {
    let collected = collect_records(fetcher).await?;

    let mut records = collected.records;
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let written = write_records(output, &records)?;

    Ok(CrawlReport {
        output: output.to_path_buf(),
        written,
        pages: collected.pages,
        skipped: collected.skipped,
        out_of_window: collected.out_of_window,
        summary: aggregate(&records),
    })
}

/// Summarize a CSV written by [`crawl`].
///
/// # Errors
///
/// * If the file cannot be read back
pub fn summarize(input: &Path, author: &str) -> Result<Summary, CrawlError> {
    let records = read_records(input, author)?;
    Ok(aggregate(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use ghactivity_activity_models::CrawlConfig;
    use ghactivity_fetcher::RetryPolicy;
    use ghactivity_source_models::{Feed, SourceError};
    use ghactivity_source_testing::{
        StaticSource, commit_json, pull_request_json, repository_json, search_json,
    };
    use serde_json::json;
    use std::collections::BTreeMap;

    fn config() -> CrawlConfig {
        CrawlConfig::new("alice").unwrap()
    }

    fn scenario_source(config: &CrawlConfig) -> StaticSource {
        let at = |day| Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap();
        let window = *config.window();
        let commits = |repository: &str| Feed::Commits {
            repository: repository.to_string(),
            author: "alice".to_string(),
            window,
        };

        StaticSource::new()
            .with_page(
                &Feed::PullRequests {
                    author: "alice".to_string(),
                    window,
                },
                1,
                search_json(1, vec![pull_request_json("alice", "r2", 1, at(4))]),
                false,
            )
            .with_page(
                &Feed::Repositories {
                    owner: "alice".to_string(),
                    include_member: false,
                },
                1,
                json!([repository_json("o1", "r1"), repository_json("alice", "r2")]),
                false,
            )
            .with_page(
                &commits("o1/r1"),
                1,
                json!([
                    commit_json("c1", at(1)),
                    commit_json("c3", at(3)),
                    commit_json("c2", at(2)),
                ]),
                false,
            )
            .with_page(&commits("alice/r2"), 1, json!([]), false)
    }

    #[tokio::test]
    async fn test_scenario_crawl() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("activity.csv");
        let config = config();
        let fetcher = Fetcher::new(scenario_source(&config), config);

        let report = crawl(&fetcher, &output).await.unwrap();

        assert_eq!(report.written, 4);
        assert_eq!(report.pages, 3);
        assert_eq!(
            report.summary.by_repository,
            BTreeMap::from([("r1".to_string(), 3), ("r2".to_string(), 1)])
        );
        assert_eq!(
            report.summary.by_organization,
            BTreeMap::from([("o1".to_string(), 3)])
        );

        let written = read_records(&output, "alice").unwrap();
        let identifiers: Vec<&str> = written.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["1", "c3", "c2", "c1"]);
        assert_eq!(summarize(&output, "alice").unwrap(), report.summary);
    }

    #[tokio::test]
    async fn test_repeated_crawls_are_identical() {
        let config = config();
        let fetcher = Fetcher::new(scenario_source(&config), config);

        let first = collect_records(&fetcher).await.unwrap();
        let second = collect_records(&fetcher).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.records.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_crawl_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("activity.csv");
        let config = config();
        let source = StaticSource::new().with_error(
            &Feed::PullRequests {
                author: "alice".to_string(),
                window: *config.window(),
            },
            1,
            SourceError::Unauthorized {
                status: 401,
                message: "Bad credentials".to_string(),
            },
        );
        let fetcher = Fetcher::new(source, config);

        let err = crawl(&fetcher, &output).await.unwrap_err();

        assert_eq!(err.exit_code(), EXIT_AUTH);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_rate_limit_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = config();
        let source = StaticSource::new().with_error(
            &Feed::PullRequests {
                author: "alice".to_string(),
                window: *config.window(),
            },
            1,
            SourceError::RateLimited {
                retry_after: Some(Duration::ZERO),
            },
        );
        let fetcher = Fetcher::new(source, config).with_retry_policy(RetryPolicy::none());

        let err = crawl(&fetcher, &dir.path().join("out.csv"))
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_unwritable_output_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = config();
        let fetcher = Fetcher::new(scenario_source(&config), config);

        let err = crawl(&fetcher, &dir.path().join("missing").join("out.csv"))
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Write(WriterError::Create { .. })));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err = CrawlError::from(ConfigError::EmptyUsername);
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
