use std::collections::VecDeque;
use std::time::Duration;

use ghactivity_activity_models::CrawlConfig;
use ghactivity_parser::{entry_count, oldest_timestamp, parse_repository_names};
use ghactivity_source::ActivitySource;
use ghactivity_source_models::{Feed, Page, PageRequest, SourceError};

use crate::{FetchError, RetryPolicy};

/// Crawls the activity of one configured user from an [`ActivitySource`].
pub struct Fetcher<S> {
    source: S,
    config: CrawlConfig,
    retry: RetryPolicy,
    page_delay: Duration,
}

impl<S: ActivitySource> Fetcher<S> {
    #[must_use]
    pub const fn new(source: S, config: CrawlConfig) -> Self {
        Self {
            source,
            config,
            retry: RetryPolicy::new(),
            page_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pause between successive page requests.
    #[must_use]
    pub const fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CrawlConfig {
        &self.config
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Start a new crawl from the first page of the first feed.
    ///
    /// Nothing is requested until [`PageCursor::next_page`] is awaited. Each call
    /// starts over, so the same fetcher can crawl any number of times.
    #[must_use]
    pub fn pages(&self) -> PageCursor<'_, S> {
        PageCursor::new(self)
    }
}

/// Position of one crawl: which feed page comes next and which repositories are
/// still waiting for their commit feed.
pub struct PageCursor<'a, S> {
    fetcher: &'a Fetcher<S>,
    next: Option<PageRequest>,
    repositories: Option<VecDeque<String>>,
    requests: u32,
    done: bool,
}

impl<'a, S: ActivitySource> PageCursor<'a, S> {
    fn new(fetcher: &'a Fetcher<S>) -> Self {
        let config = &fetcher.config;
        let feed = Feed::PullRequests {
            author: config.username().to_string(),
            window: *config.window(),
        };

        Self {
            fetcher,
            next: Some(PageRequest::first(feed, config.per_page())),
            repositories: None,
            requests: 0,
            done: false,
        }
    }

    /// Requests sent to the source so far, retries excluded.
    #[must_use]
    pub const fn requests(&self) -> u32 {
        self.requests
    }

    /// Fetch the next page holding activity records.
    ///
    /// Returns `Ok(None)` once every feed is exhausted. After an error the cursor
    /// is finished as well.
    ///
    /// # Errors
    ///
    /// * If the source rejects the credentials
    /// * If the source stays rate limited after every allowed retry
    /// * If the source cannot be reached or answers with an unexpected error
    pub async fn next_page(&mut self) -> Result<Option<Page>, FetchError> {
        if self.done {
            return Ok(None);
        }

        let result = self.advance().await;
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    async fn advance(&mut self) -> Result<Option<Page>, FetchError> {
        loop {
            let Some(request) = self.next.take() else {
                let Some(repository) = self.next_repository().await? else {
                    return Ok(None);
                };
                self.next = Some(PageRequest::first(
                    self.commits_feed(repository),
                    self.fetcher.config.per_page(),
                ));
                continue;
            };

            match self.fetch(&request).await {
                Ok(page) => {
                    if self.has_more(&page) {
                        self.next = Some(request.next());
                    } else {
                        log::debug!("Finished {} at page {}", page.feed, page.number);
                    }
                    return Ok(Some(page));
                }
                Err(e)
                    if matches!(request.feed, Feed::Commits { .. })
                        && e.source_error().is_missing_resource() =>
                {
                    log::warn!("Skipping {}: {}", request.feed, e.source_error());
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn commits_feed(&self, repository: String) -> Feed {
        let config = &self.fetcher.config;
        Feed::Commits {
            repository,
            author: config.username().to_string(),
            window: *config.window(),
        }
    }

    async fn next_repository(&mut self) -> Result<Option<String>, FetchError> {
        if self.repositories.is_none() {
            self.repositories = Some(self.discover_repositories().await?);
        }
        Ok(self.repositories.as_mut().and_then(VecDeque::pop_front))
    }

    async fn discover_repositories(&mut self) -> Result<VecDeque<String>, FetchError> {
        let fetcher = self.fetcher;
        let config = &fetcher.config;
        let feed = Feed::Repositories {
            owner: config.username().to_string(),
            include_member: config.include_member_repos(),
        };
        log::info!("Fetching {feed}");

        let mut request = PageRequest::first(feed, config.per_page());
        let mut repositories = VecDeque::new();

        loop {
            let page = self.fetch(&request).await?;
            repositories.extend(parse_repository_names(&page));

            if !page.has_next || entry_count(&page) == 0 {
                break;
            }
            request = request.next();
        }

        log::info!(
            "Found {} repositories of {}",
            repositories.len(),
            config.username()
        );
        Ok(repositories)
    }

    /// Whether the feed of `page` should be followed to its next page.
    fn has_more(&self, page: &Page) -> bool {
        if !page.has_next || entry_count(page) == 0 {
            return false;
        }

        if let Some(oldest) = oldest_timestamp(page)
            && self.fetcher.config.window().is_before_start(&oldest)
        {
            log::debug!(
                "Stopping {} early: page {} reaches back to {oldest}",
                page.feed,
                page.number
            );
            return false;
        }

        true
    }

    async fn fetch(&mut self, request: &PageRequest) -> Result<Page, FetchError> {
        let fetcher = self.fetcher;

        if self.requests > 0 && !fetcher.page_delay.is_zero() {
            tokio::time::sleep(fetcher.page_delay).await;
        }
        self.requests += 1;

        if request.page == 1 && request.feed.yields_records() {
            log::info!("Fetching {}", request.feed);
        }

        let mut retries = 0;
        loop {
            match fetcher.source.fetch_page(request).await {
                Ok(page) => return Ok(page),
                Err(SourceError::RateLimited { retry_after })
                    if retries < fetcher.retry.max_retries() =>
                {
                    let delay = fetcher.retry.delay(retries, retry_after);
                    retries += 1;
                    log::warn!(
                        "Rate limited on page {} of {}, retry {retries}/{} in {:.1}s",
                        request.page,
                        request.feed,
                        fetcher.retry.max_retries(),
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(FetchError::from_source(
                        request.feed.to_string(),
                        retries,
                        e,
                    ));
                }
            }
        }
    }
}
