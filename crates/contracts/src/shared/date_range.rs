use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// IST offset (+05:30). All dashboard date defaults are in Indian Standard Time
/// because the upstream loan book operates in IST.
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid IST offset")
}

/// Today's date in IST
pub fn today_ist() -> NaiveDate {
    Utc::now().with_timezone(&ist_offset()).date_naive()
}

/// Inclusive date range used by every insights endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl DateRange {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self { date_from, date_to }
    }

    /// Single-day range for today (IST)
    pub fn today() -> Self {
        let today = today_ist();
        Self::new(today, today)
    }

    /// Parse `YYYY-MM-DD` bounds; either side falls back to today (IST)
    /// when missing or malformed, matching the dashboard's filter behavior.
    pub fn from_params(date_from: Option<&str>, date_to: Option<&str>) -> Self {
        let parse = |s: Option<&str>| {
            s.filter(|v| !v.is_empty())
                .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };
        let today = today_ist();
        Self::new(
            parse(date_from).unwrap_or(today),
            parse(date_to).unwrap_or(today),
        )
    }

    /// Query parameters in the upstream's `startDate`/`endDate` convention
    pub fn as_upstream_params(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.date_from.format("%Y-%m-%d").to_string()),
            ("endDate", self.date_to.format("%Y-%m-%d").to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params_parses_valid_dates() {
        let range = DateRange::from_params(Some("2025-01-01"), Some("2025-01-31"));
        assert_eq!(range.date_from, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(range.date_to, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn test_from_params_falls_back_to_today() {
        let range = DateRange::from_params(Some("not-a-date"), None);
        let today = today_ist();
        assert_eq!(range.date_from, today);
        assert_eq!(range.date_to, today);
    }

    #[test]
    fn test_upstream_params_format() {
        let range = DateRange::from_params(Some("2025-03-05"), Some("2025-03-07"));
        let params = range.as_upstream_params();
        assert_eq!(params[0], ("startDate", "2025-03-05".to_string()));
        assert_eq!(params[1], ("endDate", "2025-03-07".to_string()));
    }
}
