use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use ghactivity_source::ActivitySource;
use ghactivity_source_models::{Feed, Page, PageRequest, SourceError};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "ghactivity";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The search API never serves more than this many results for one query.
const SEARCH_RESULT_LIMIT: u64 = 1000;

pub struct GitHubSource {
    http_client: reqwest::Client,
    auth_token: Option<String>,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl GitHubSource {
    /// Create a new GitHub source without authentication.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            auth_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    fn endpoint(&self, feed: &Feed) -> String {
        match feed {
            Feed::PullRequests { .. } => format!("{}/search/issues", self.base_url),
            Feed::Repositories { owner, .. } => format!("{}/users/{owner}/repos", self.base_url),
            Feed::Commits { repository, .. } => {
                format!("{}/repos/{repository}/commits", self.base_url)
            }
        }
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ActivitySource for GitHubSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, SourceError> {
        let url = self.endpoint(&request.feed);
        let query = feed_query(request);
        log::debug!("GET {url} (page {})", request.page);

        let mut http_request = self
            .http_client
            .get(&url)
            .query(&query)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", self.user_agent.as_str())
            .timeout(self.timeout);

        if let Some(token) = &self.auth_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request.send().await.map_err(network_error)?;
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("GitHub API error: {body}");
            return Err(classify_error(
                status,
                &headers,
                &url,
                &body,
                self.auth_token.is_some(),
            ));
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
                message: e.to_string(),
            })?;

        let has_next = link_has_next(&headers).unwrap_or_else(|| infer_has_next(request, &body));

        Ok(Page::new(
            request.feed.clone(),
            request.page,
            body,
            has_next,
        ))
    }

    fn source_name(&self) -> &str {
        "github"
    }
}

fn network_error(error: reqwest::Error) -> SourceError {
    SourceError::Network {
        message: error.to_string(),
    }
}

fn feed_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = match &request.feed {
        Feed::PullRequests { author, window } => vec![
            (
                "q",
                format!(
                    "author:{author} is:pr{}",
                    created_qualifier(window.start, window.end)
                ),
            ),
            ("sort", "created".to_string()),
            ("order", "desc".to_string()),
        ],
        Feed::Repositories { include_member, .. } => vec![
            (
                "type",
                if *include_member { "all" } else { "owner" }.to_string(),
            ),
            ("sort", "pushed".to_string()),
        ],
        Feed::Commits { author, window, .. } => {
            let mut query = vec![("author", author.clone())];
            if let Some(start) = &window.start {
                query.push(("since", format_timestamp(start)));
            }
            if let Some(end) = &window.end {
                query.push(("until", format_timestamp(end)));
            }
            query
        }
    };

    query.push(("page", request.page.to_string()));
    query.push(("per_page", request.per_page.to_string()));
    query
}

/// Search qualifier restricting results to the window, `*` marking an open side.
fn created_qualifier(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    if start.is_none() && end.is_none() {
        return String::new();
    }
    let bound = |ts: Option<DateTime<Utc>>| ts.map_or_else(|| "*".to_string(), |ts| format_timestamp(&ts));
    format!(" created:{}..{}", bound(start), bound(end))
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// `Some` when the response carries a `Link` header.
fn link_has_next(headers: &HeaderMap) -> Option<bool> {
    let link = header_str(headers, LINK.as_str())?;
    Some(link.split(',').any(|part| {
        part.split(';')
            .skip(1)
            .any(|param| param.trim() == r#"rel="next""#)
    }))
}

fn infer_has_next(request: &PageRequest, body: &serde_json::Value) -> bool {
    match &request.feed {
        Feed::PullRequests { .. } => {
            let total = body
                .get("total_count")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0);
            let seen = u64::from(request.page) * u64::from(request.per_page);
            seen < total.min(SEARCH_RESULT_LIMIT)
        }
        Feed::Repositories { .. } | Feed::Commits { .. } => {
            let per_page = usize::try_from(request.per_page).unwrap_or(usize::MAX);
            body.as_array().is_some_and(|items| items.len() >= per_page)
        }
    }
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn is_rate_limited(headers: &HeaderMap, message: &str) -> bool {
    header_str(headers, "x-ratelimit-remaining").is_some_and(|v| v.trim() == "0")
        || headers.contains_key(RETRY_AFTER)
        || message.to_ascii_lowercase().contains("rate limit")
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(seconds) =
        header_str(headers, RETRY_AFTER.as_str()).and_then(|v| v.trim().parse::<u64>().ok())
    {
        return Some(Duration::from_secs(seconds));
    }

    let reset = header_str(headers, "x-ratelimit-reset")?
        .trim()
        .parse::<i64>()
        .ok()?;
    let wait = u64::try_from(reset - Utc::now().timestamp()).ok()?;
    (wait > 0).then(|| Duration::from_secs(wait))
}

fn classify_error(
    status: StatusCode,
    headers: &HeaderMap,
    url: &str,
    body: &str,
    authenticated: bool,
) -> SourceError {
    let message = api_message(body);

    match status {
        StatusCode::UNAUTHORIZED => SourceError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited {
            retry_after: retry_after(headers),
        },
        StatusCode::FORBIDDEN if is_rate_limited(headers, &message) => SourceError::RateLimited {
            retry_after: retry_after(headers),
        },
        StatusCode::FORBIDDEN if authenticated => SourceError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::NOT_FOUND => SourceError::NotFound {
            url: url.to_string(),
        },
        StatusCode::CONFLICT => SourceError::Conflict {
            url: url.to_string(),
            message,
        },
        _ => SourceError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
