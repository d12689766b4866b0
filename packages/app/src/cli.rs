use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ghactivity_activity_models::{ConfigError, CrawlConfig, DEFAULT_PER_PAGE, TimeWindow};
use ghactivity_fetcher::RetryPolicy;
use ghactivity_github::{DEFAULT_BASE_URL, GitHubSource};

#[derive(Debug, Parser)]
#[command(name = "ghactivity", version)]
#[command(about = "Crawl a GitHub user's commits and pull requests into CSV", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Crawl a user's activity and write it to a CSV file")]
    Crawl(CrawlArgs),
    #[command(about = "Print counts from a previously written CSV file")]
    Summarize(SummarizeArgs),
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// GitHub username to crawl.
    #[arg(short, long)]
    pub user: String,

    /// Earliest activity to include, `YYYY-MM-DD` or RFC 3339.
    #[arg(long)]
    pub since: Option<String>,

    /// Latest activity to include, `YYYY-MM-DD` (whole day) or RFC 3339.
    #[arg(long)]
    pub until: Option<String>,

    #[arg(short, long, default_value = "github_activity.csv")]
    pub output: PathBuf,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Pause between page requests.
    #[arg(long, default_value_t = 1000)]
    pub page_delay_ms: u64,

    /// Retries of a rate-limited request before giving up.
    #[arg(long, default_value_t = RetryPolicy::DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Also crawl repositories the user is a member of.
    #[arg(long)]
    pub all_repos: bool,
}

impl CrawlArgs {
    /// # Errors
    ///
    /// * If the username is empty
    /// * If `--since`/`--until` cannot be parsed or are inverted
    pub fn config(&self) -> Result<CrawlConfig, ConfigError> {
        let window = TimeWindow::parse(self.since.as_deref(), self.until.as_deref())?;

        Ok(CrawlConfig::new(self.user.as_str())?
            .with_window(window)
            .with_token(self.token.clone())
            .with_per_page(self.per_page)
            .with_member_repos(self.all_repos))
    }

    #[must_use]
    pub fn source(&self, config: &CrawlConfig) -> GitHubSource {
        let mut source = GitHubSource::new()
            .with_base_url(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if let Some(token) = config.token() {
            source = source.with_token(token.to_string());
        }

        source
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new().with_max_retries(self.max_retries)
    }

    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// CSV file written by `crawl`.
    pub input: PathBuf,

    /// Author to attribute the records to.
    #[arg(short, long, default_value = "")]
    pub user: String,

    /// Number of repositories to list.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}
