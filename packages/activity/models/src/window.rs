use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::config::ConfigError;

/// Inclusive time window a crawl is restricted to. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// A window with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Create a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// * If `start` is after `end`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ConfigError> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(ConfigError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from user supplied bounds.
    ///
    /// Each bound is either an RFC 3339 timestamp or a plain `YYYY-MM-DD` date. A
    /// plain start date means the start of that day and a plain end date means the
    /// last instant of that day, both in UTC.
    ///
    /// # Errors
    ///
    /// * If a bound cannot be parsed
    /// * If the start is after the end
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self, ConfigError> {
        let start = since.map(|s| parse_bound(s, Bound::Start)).transpose()?;
        let end = until.map(|s| parse_bound(s, Bound::End)).transpose()?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    #[must_use]
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(start) = &self.start
            && timestamp < start
        {
            return false;
        }
        if let Some(end) = &self.end
            && timestamp > end
        {
            return false;
        }
        true
    }

    /// Whether `timestamp` is older than the window start.
    #[must_use]
    pub fn is_before_start(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start.is_some_and(|start| *timestamp < start)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(value: &str, bound: Bound) -> Result<DateTime<Utc>, ConfigError> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let invalid = || ConfigError::InvalidDate {
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = date.and_time(NaiveTime::MIN).and_utc();

    match bound {
        Bound::Start => Ok(midnight),
        Bound::End => midnight
            .checked_add_signed(TimeDelta::days(1) - TimeDelta::seconds(1))
            .ok_or_else(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_plain_dates_cover_whole_days() {
        let window = TimeWindow::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();

        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            window.end,
            Some(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        let window = TimeWindow::parse(Some("2024-03-01T10:00:00+02:00"), None).unwrap();

        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
        );
        assert!(window.end.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = TimeWindow::parse(Some("last tuesday"), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { .. }));
    }

    #[test]
    fn test_parse_last_representable_day() {
        let window = TimeWindow::parse(None, Some("+262143-12-31")).unwrap();
        let midnight = NaiveDate::from_ymd_opt(262_143, 12, 31)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();

        assert_eq!(window.end, Some(midnight + TimeDelta::seconds(86_399)));
    }

    #[test]
    fn test_parse_rejects_date_past_representable_range() {
        let err = TimeWindow::parse(None, Some("+262144-01-01")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { .. }));
    }

    #[test]
    fn test_parse_rejects_inverted_window() {
        let err = TimeWindow::parse(Some("2024-05-01"), Some("2024-04-01")).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedWindow { .. }));
    }

    #[test]
    fn test_same_day_window_is_valid() {
        let window = TimeWindow::parse(Some("2024-05-01"), Some("2024-05-01")).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert!(window.contains(&noon));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = TimeWindow::new(Some(start), Some(end)).unwrap();

        assert!(window.contains(&start));
        assert!(window.contains(&end));
        assert!(!window.contains(&(start - chrono::Duration::seconds(1))));
        assert!(!window.contains(&(end + chrono::Duration::seconds(1))));
    }

    #[test]
    fn test_unbounded_contains_everything() {
        let window = TimeWindow::unbounded();
        let ts = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();

        assert!(window.is_unbounded());
        assert!(window.contains(&ts));
        assert!(!window.is_before_start(&ts));
    }

    #[test]
    fn test_is_before_start() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = TimeWindow::new(Some(start), None).unwrap();

        assert!(window.is_before_start(&(start - chrono::Duration::days(1))));
        assert!(!window.is_before_start(&start));
    }
}
