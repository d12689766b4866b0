use chrono::{DateTime, Utc};
use ghactivity_github_models::{GithubCommitItem, GithubIssueItem, GithubRepositoryItem};
use ghactivity_source_models::{Feed, Page};

const NO_ENTRIES: &[serde_json::Value] = &[];

/// The raw entries of a page: `items` for search results, the body itself for listings.
pub(crate) fn entries(page: &Page) -> &[serde_json::Value] {
    let entries = match &page.feed {
        Feed::PullRequests { .. } => page.body.get("items").and_then(serde_json::Value::as_array),
        Feed::Repositories { .. } | Feed::Commits { .. } => page.body.as_array(),
    };

    entries.map_or_else(
        || {
            log::warn!("Unexpected body on page {} of {}", page.number, page.feed);
            NO_ENTRIES
        },
        Vec::as_slice,
    )
}

/// Number of raw entries on a page, readable or not.
#[must_use]
pub fn entry_count(page: &Page) -> usize {
    entries(page).len()
}

/// Full `owner/name` of every repository on a listing page, in listing order.
#[must_use]
pub fn parse_repository_names(page: &Page) -> Vec<String> {
    if !matches!(page.feed, Feed::Repositories { .. }) {
        return vec![];
    }

    entries(page)
        .iter()
        .filter_map(|entry| {
            match serde_json::from_value::<GithubRepositoryItem>(entry.clone()) {
                Ok(repository) => Some(repository.full_name),
                Err(e) => {
                    log::warn!("Skipping repository entry on page {}: {e}", page.number);
                    None
                }
            }
        })
        .collect()
}

/// Oldest timestamp among the readable entries of a record page, measured on the
/// date the feed is ordered by: creation for pull requests, committer date for
/// commits.
#[must_use]
pub fn oldest_timestamp(page: &Page) -> Option<DateTime<Utc>> {
    let entries = entries(page).iter().cloned();

    match &page.feed {
        Feed::PullRequests { .. } => entries
            .filter_map(|e| serde_json::from_value::<GithubIssueItem>(e).ok())
            .map(|item| item.created_at)
            .min(),
        Feed::Commits { .. } => entries
            .filter_map(|e| serde_json::from_value::<GithubCommitItem>(e).ok())
            .filter_map(|item| item.committed_at())
            .min(),
        Feed::Repositories { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ghactivity_activity_models::TimeWindow;
    use serde_json::json;

    #[test]
    fn test_repository_names_in_listing_order() {
        let page = Page::new(
            Feed::Repositories {
                owner: "alice".to_string(),
                include_member: false,
            },
            1,
            json!([
                { "name": "r2", "full_name": "alice/r2", "owner": { "login": "alice" }, "fork": true },
                { "full_name": "broken" },
                { "name": "r1", "full_name": "o1/r1", "owner": { "login": "o1" } },
            ]),
            false,
        );

        assert_eq!(parse_repository_names(&page), vec!["alice/r2", "o1/r1"]);
    }

    #[test]
    fn test_oldest_commit_timestamp() {
        let page = Page::new(
            Feed::Commits {
                repository: "o1/r1".to_string(),
                author: "alice".to_string(),
                window: TimeWindow::unbounded(),
            },
            1,
            json!([
                { "sha": "b", "commit": { "author": { "date": "2025-01-02T00:00:00Z" } } },
                { "sha": "a", "commit": { "committer": { "date": "2024-12-31T00:00:00Z" } } },
                { "sha": "c" },
            ]),
            false,
        );

        assert_eq!(
            oldest_timestamp(&page),
            Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_oldest_timestamp_of_empty_page() {
        let page = Page::new(
            Feed::PullRequests {
                author: "alice".to_string(),
                window: TimeWindow::unbounded(),
            },
            1,
            json!({ "total_count": 0, "items": [] }),
            false,
        );

        assert_eq!(oldest_timestamp(&page), None);
    }

    #[test]
    fn test_oldest_commit_uses_committer_date() {
        let page = Page::new(
            Feed::Commits {
                repository: "o1/r1".to_string(),
                author: "alice".to_string(),
                window: TimeWindow::unbounded(),
            },
            1,
            json!([
                { "sha": "new", "commit": { "author": { "date": "2025-01-06T00:00:00Z" }, "committer": { "date": "2025-01-06T00:00:00Z" } } },
                { "sha": "rebased", "commit": { "author": { "date": "2024-12-01T00:00:00Z" }, "committer": { "date": "2025-01-05T00:00:00Z" } } },
            ]),
            true,
        );

        assert_eq!(
            oldest_timestamp(&page),
            Some(Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap())
        );
    }
}
