use std::path::PathBuf;

use ghactivity_activity_models::CrawlConfig;
use ghactivity_fetcher::{Fetcher, RetryPolicy};
use ghactivity_github::GitHubSource;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock GitHub API plus a scratch directory for output files.
pub struct MockGitHub {
    pub server: MockServer,
    dir: TempDir,
}

impl MockGitHub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("github_activity.csv")
    }

    pub fn fetcher(&self, config: CrawlConfig) -> Fetcher<GitHubSource> {
        let source = GitHubSource::new()
            .with_token("test-token".to_string())
            .with_base_url(self.server.uri());

        Fetcher::new(source, config)
            .with_retry_policy(RetryPolicy::new().with_initial_delay(std::time::Duration::ZERO))
    }

    pub async fn mount_search(&self, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_repositories(&self, owner: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/users/{owner}/repos")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_commits(&self, repository: &str, page: u32, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{repository}/commits")))
            .and(query_param("page", page.to_string()))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }
}
