#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Lazy, restartable crawling of a user's activity feeds.
//!
//! A [`Fetcher`] walks the pull request search, discovers the user's repositories
//! and then walks each repository's commit listing. Pages are handed out one at a
//! time through a [`PageCursor`]. Rate limits are absorbed with exponential backoff
//! according to a [`RetryPolicy`].

mod cursor;
mod retry;

use ghactivity_source_models::SourceError;

pub use cursor::{Fetcher, PageCursor};
pub use retry::RetryPolicy;

/// Errors that end a crawl.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source rejected our credentials.
    #[error("Authentication failed while fetching {feed}")]
    Auth { feed: String, source: SourceError },

    /// Still rate limited after every allowed retry.
    #[error("Rate limit not lifted after {retries} retries while fetching {feed}")]
    RateLimit {
        feed: String,
        retries: u32,
        source: SourceError,
    },

    /// The source could not be reached.
    #[error("Network failure while fetching {feed}")]
    Network { feed: String, source: SourceError },

    /// Any other failure reported by the source.
    #[error("Failed to fetch {feed}")]
    Source { feed: String, source: SourceError },
}

impl FetchError {
    fn from_source(feed: String, retries: u32, source: SourceError) -> Self {
        match source {
            SourceError::Unauthorized { .. } => Self::Auth { feed, source },
            SourceError::RateLimited { .. } => Self::RateLimit {
                feed,
                retries,
                source,
            },
            SourceError::Network { .. } => Self::Network { feed, source },
            SourceError::NotFound { .. }
            | SourceError::Conflict { .. }
            | SourceError::Status { .. }
            | SourceError::Decode { .. } => Self::Source { feed, source },
        }
    }

    /// The underlying source error.
    #[must_use]
    pub const fn source_error(&self) -> &SourceError {
        match self {
            Self::Auth { source, .. }
            | Self::RateLimit { source, .. }
            | Self::Network { source, .. }
            | Self::Source { source, .. } => source,
        }
    }
}
