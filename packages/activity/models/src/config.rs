use chrono::{DateTime, Utc};

use crate::window::TimeWindow;

/// Page size requested from the source unless configured otherwise.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Largest page size the GitHub REST API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Errors raised while building a crawl configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No username was given.
    #[error("Username must not be empty")]
    EmptyUsername,

    /// A window bound could not be parsed.
    #[error("Invalid date '{value}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// The window start is after its end.
    #[error("Start time {start} is after end time {end}")]
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Immutable settings for one crawl.
#[derive(Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    username: String,
    window: TimeWindow,
    token: Option<String>,
    per_page: u32,
    include_member_repos: bool,
}

impl CrawlConfig {
    /// Create a configuration for `username` with an unbounded window.
    ///
    /// # Errors
    ///
    /// * If `username` is empty or only whitespace
    pub fn new(username: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }

        Ok(Self {
            username,
            window: TimeWindow::unbounded(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
            include_member_repos: false,
        })
    }

    #[must_use]
    pub const fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Set the API token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the page size, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Also crawl repositories the user is a member of, not only the ones they own.
    #[must_use]
    pub const fn with_member_repos(mut self, include: bool) -> Self {
        self.include_member_repos = include;
        self
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn window(&self) -> &TimeWindow {
        &self.window
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub const fn include_member_repos(&self) -> bool {
        self.include_member_repos
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for CrawlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlConfig")
            .field("username", &self.username)
            .field("window", &self.window)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("per_page", &self.per_page)
            .field("include_member_repos", &self.include_member_repos)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_username() {
        let config = CrawlConfig::new("  alice ").unwrap();
        assert_eq!(config.username(), "alice");
        assert!(config.window().is_unbounded());
        assert_eq!(config.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_new_rejects_empty_username() {
        assert!(matches!(
            CrawlConfig::new("   "),
            Err(ConfigError::EmptyUsername)
        ));
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let config = CrawlConfig::new("alice")
            .unwrap()
            .with_token(Some(String::new()));
        assert!(config.token().is_none());
    }

    #[test]
    fn test_per_page_is_clamped() {
        let config = CrawlConfig::new("alice").unwrap().with_per_page(500);
        assert_eq!(config.per_page(), MAX_PER_PAGE);

        let config = CrawlConfig::new("alice").unwrap().with_per_page(0);
        assert_eq!(config.per_page(), 1);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = CrawlConfig::new("alice")
            .unwrap()
            .with_token(Some("ghp_secret".to_string()));
        let debug = format!("{config:?}");

        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
