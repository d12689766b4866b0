use std::fmt;

use ghactivity_aggregate::Summary;

/// Pretty printed JSON rendering of a [`Summary`].
///
/// # Errors
///
/// * If the summary cannot be encoded
pub fn summary_json(summary: &Summary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Human readable rendering of a [`Summary`].
pub struct SummaryReport<'a> {
    summary: &'a Summary,
    top: usize,
}

impl<'a> SummaryReport<'a> {
    /// Render `summary`, listing at most `top` repositories.
    #[must_use]
    pub const fn new(summary: &'a Summary, top: usize) -> Self {
        Self { summary, top }
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;

        writeln!(f, "Total activities: {}", summary.total)?;
        writeln!(f, "Commits: {}", summary.commits)?;
        writeln!(f, "Pull requests: {}", summary.pull_requests)?;

        if let (Some(first), Some(last)) = (summary.first, summary.last) {
            writeln!(
                f,
                "Date range: {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?;
        }

        if !summary.by_repository.is_empty() {
            writeln!(f, "Top repositories:")?;
            for (repository, count) in summary.top_repositories(self.top) {
                writeln!(f, "  {repository}: {count}")?;
            }
        }

        if !summary.by_organization.is_empty() {
            writeln!(f, "Organizations:")?;
            for (organization, count) in &summary.by_organization {
                writeln!(f, "  {organization}: {count}")?;
            }
        }

        Ok(())
    }
}
