use chrono::{DateTime, Utc};
use strum_macros::{AsRefStr, Display, EnumString};

/// What kind of contribution a [`Record`] describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    Display,
    EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    Commit,
    PullRequest,
}

/// A single commit or pull request attributed to the crawled user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub kind: RecordKind,
    /// Repository name, without the owner.
    pub repository: String,
    /// Owning account when it is not the crawled user.
    pub organization: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Commit SHA or pull request number.
    pub identifier: String,
    /// The crawled username.
    pub author: String,
}

impl Record {
    #[must_use]
    pub fn commit(
        repository: impl Into<String>,
        organization: Option<String>,
        timestamp: DateTime<Utc>,
        sha: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: RecordKind::Commit,
            repository: repository.into(),
            organization,
            timestamp,
            identifier: sha.into(),
            author: author.into(),
        }
    }

    #[must_use]
    pub fn pull_request(
        repository: impl Into<String>,
        organization: Option<String>,
        timestamp: DateTime<Utc>,
        number: u64,
        author: impl Into<String>,
    ) -> Self {
        Self {
            kind: RecordKind::PullRequest,
            repository: repository.into(),
            organization,
            timestamp,
            identifier: number.to_string(),
            author: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_record_kind_string_forms() {
        assert_eq!(RecordKind::Commit.to_string(), "commit");
        assert_eq!(RecordKind::PullRequest.as_ref(), "pull_request");
        assert_eq!(
            RecordKind::from_str("pull_request").unwrap(),
            RecordKind::PullRequest
        );
        assert!(RecordKind::from_str("issue").is_err());
    }

    #[test]
    fn test_pull_request_identifier_is_number() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = Record::pull_request("r2", None, ts, 42, "alice");

        assert_eq!(record.kind, RecordKind::PullRequest);
        assert_eq!(record.identifier, "42");
        assert_eq!(record.author, "alice");
        assert!(record.organization.is_none());
    }
}
