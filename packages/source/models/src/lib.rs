#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Source models for `ghactivity`.
//!
//! These types describe what is asked of an activity source (a [`PageRequest`] on
//! a [`Feed`]) and what comes back (a raw [`Page`] or a [`SourceError`]). They are
//! shared by every source implementation so the fetcher never sees transport types.

use std::fmt;
use std::time::Duration;

use ghactivity_activity_models::TimeWindow;

/// One paginated listing on the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Pull requests opened by `author`, newest first.
    PullRequests { author: String, window: TimeWindow },
    /// Repositories belonging to `owner`. Used for discovery only.
    Repositories { owner: String, include_member: bool },
    /// Commits by `author` in one repository, newest first.
    Commits {
        /// Full `owner/name` of the repository.
        repository: String,
        author: String,
        window: TimeWindow,
    },
}

impl Feed {
    /// Whether pages of this feed contain activity records.
    #[must_use]
    pub const fn yields_records(&self) -> bool {
        !matches!(self, Self::Repositories { .. })
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequests { author, .. } => write!(f, "pull requests by {author}"),
            Self::Repositories { owner, .. } => write!(f, "repositories of {owner}"),
            Self::Commits {
                repository, author, ..
            } => write!(f, "commits by {author} in {repository}"),
        }
    }
}

/// A request for one page of a feed. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub feed: Feed,
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    #[must_use]
    pub const fn first(feed: Feed, per_page: u32) -> Self {
        Self {
            feed,
            page: 1,
            per_page,
        }
    }

    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            feed: self.feed.clone(),
            page: self.page + 1,
            per_page: self.per_page,
        }
    }
}

/// A raw page returned by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub feed: Feed,
    pub number: u32,
    /// The decoded response body, untouched.
    pub body: serde_json::Value,
    /// Whether the source reported another page after this one.
    pub has_next: bool,
}

impl Page {
    #[must_use]
    pub const fn new(feed: Feed, number: u32, body: serde_json::Value, has_next: bool) -> Self {
        Self {
            feed,
            number,
            body,
            has_next,
        }
    }
}

/// Errors a source can answer a page request with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The request never produced a response (connection, DNS, timeout).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The credentials were rejected.
    #[error("Authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The source asked us to slow down.
    #[error("Rate limited{}", retry_hint(.retry_after.as_ref()))]
    RateLimited {
        /// Wait time hinted by the source, if any.
        retry_after: Option<Duration>,
    },

    /// The requested resource does not exist.
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// The resource exists but cannot be listed (e.g. an empty repository).
    #[error("Conflict at {url}: {message}")]
    Conflict { url: String, message: String },

    /// Any other unsuccessful status.
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

fn retry_hint(retry_after: Option<&Duration>) -> String {
    retry_after.map_or_else(String::new, |d| format!(", retry after {}s", d.as_secs()))
}

impl SourceError {
    /// Whether waiting and asking again can succeed.
    #[must_use]
    pub const fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Whether the error means the resource is simply absent or unlistable.
    #[must_use]
    pub const fn is_missing_resource(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Conflict { .. })
    }
}
