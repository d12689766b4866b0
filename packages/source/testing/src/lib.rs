#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use ghactivity_source::ActivitySource;
use ghactivity_source_models::{Feed, Page, PageRequest, SourceError};
use serde_json::json;

struct Script {
    feed: Feed,
    page: u32,
    responses: VecDeque<Result<(serde_json::Value, bool), SourceError>>,
}

/// An [`ActivitySource`] answering from canned pages.
///
/// Responses registered for the same feed page are served in order and the last
/// one repeats forever, so a scripted error followed by a page models a transient
/// failure while a lone page can be crawled any number of times. Requests for
/// pages nothing was registered for answer [`SourceError::NotFound`].
#[derive(Default)]
pub struct StaticSource {
    scripts: Mutex<Vec<Script>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(self, feed: &Feed, page: u32, body: serde_json::Value, has_next: bool) -> Self {
        self.push(feed, page, Ok((body, has_next)));
        self
    }

    #[must_use]
    pub fn with_error(self, feed: &Feed, page: u32, error: SourceError) -> Self {
        self.push(feed, page, Err(error));
        self
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, feed: &Feed, page: u32, response: Result<(serde_json::Value, bool), SourceError>) {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(script) = scripts
            .iter_mut()
            .find(|s| s.feed == *feed && s.page == page)
        {
            script.responses.push_back(response);
        } else {
            scripts.push(Script {
                feed: feed.clone(),
                page,
                responses: VecDeque::from([response]),
            });
        }
    }
}

#[async_trait::async_trait]
impl ActivitySource for StaticSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let response = scripts
            .iter_mut()
            .find(|s| s.feed == request.feed && s.page == request.page)
            .and_then(|script| {
                if script.responses.len() > 1 {
                    script.responses.pop_front()
                } else {
                    script.responses.front().cloned()
                }
            })
            .ok_or_else(|| SourceError::NotFound {
                url: format!("{} (page {})", request.feed, request.page),
            })?;

        response.map(|(body, has_next)| {
            Page::new(request.feed.clone(), request.page, body, has_next)
        })
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A commit listing entry.
#[must_use]
pub fn commit_json(sha: &str, authored_at: DateTime<Utc>) -> serde_json::Value {
    rebased_commit_json(sha, authored_at, authored_at)
}

/// A commit listing entry whose committer date differs from its author date, as
/// after a rebase or cherry-pick.
#[must_use]
pub fn rebased_commit_json(
    sha: &str,
    authored_at: DateTime<Utc>,
    committed_at: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "sha": sha,
        "commit": {
            "author": { "name": "Test User", "email": "test@example.com", "date": timestamp(authored_at) },
            "committer": { "name": "GitHub", "email": "noreply@github.com", "date": timestamp(committed_at) },
            "message": format!("Commit {sha}")
        }
    })
}

/// A pull request as returned by the issue search.
#[must_use]
pub fn pull_request_json(
    owner: &str,
    repo: &str,
    number: u64,
    created_at: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "number": number,
        "created_at": timestamp(created_at),
        "repository_url": format!("https://api.github.com/repos/{owner}/{repo}"),
        "pull_request": {
            "url": format!("https://api.github.com/repos/{owner}/{repo}/pulls/{number}")
        }
    })
}

/// The envelope of an issue search page.
#[must_use]
pub fn search_json(total_count: u64, items: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
}

/// A repository listing entry.
#[must_use]
pub fn repository_json(owner: &str, name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner },
        "fork": false,
        "size": 1
    })
}
