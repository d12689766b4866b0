#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Counting of [`Record`]s by repository and by organization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ghactivity_activity_models::{Record, RecordKind};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub commits: usize,
    pub pull_requests: usize,
    /// Oldest record timestamp.
    pub first: Option<DateTime<Utc>>,
    /// Newest record timestamp.
    pub last: Option<DateTime<Utc>>,
    pub by_repository: BTreeMap<String, usize>,
    /// Records without an organization are not counted here.
    pub by_organization: BTreeMap<String, usize>,
}

impl Summary {
    /// The `n` most active repositories, busiest first, ties by name.
    #[must_use]
    pub fn top_repositories(&self, n: usize) -> Vec<(&str, usize)> {
        let mut repositories: Vec<(&str, usize)> = self
            .by_repository
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        repositories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        repositories.truncate(n);
        repositories
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Count `records`. The result does not depend on their order.
#[must_use]
pub fn aggregate(records: &[Record]) -> Summary {
    let mut summary = Summary::default();

    for record in records {
        summary.total += 1;
        match record.kind {
            RecordKind::Commit => summary.commits += 1,
            RecordKind::PullRequest => summary.pull_requests += 1,
        }

        summary.first = Some(
            summary
                .first
                .map_or(record.timestamp, |first| first.min(record.timestamp)),
        );
        summary.last = Some(
            summary
                .last
                .map_or(record.timestamp, |last| last.max(record.timestamp)),
        );

        if !record.repository.is_empty() {
            *summary
                .by_repository
                .entry(record.repository.clone())
                .or_default() += 1;
        }
        if let Some(organization) = &record.organization {
            *summary
                .by_organization
                .entry(organization.clone())
                .or_default() += 1;
        }
    }

    summary
}
