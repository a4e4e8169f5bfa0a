use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::forms::orders::{parse_day, start_of};
use crate::forms::{FormError, FormResult};

/// Days covered by the summary when no range is given.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Longest range accepted for a summary.
const MAX_RANGE_DAYS: i64 = 366;

/// Query parameters accepted by the analytics summary.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// Inclusive first day, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Inclusive last day, `YYYY-MM-DD`.
    pub to: Option<String>,
}

/// Half-open `[from, to)` timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl DateRange {
    pub fn first_day(&self) -> NaiveDate {
        self.from.date()
    }

    /// Last day included in the range.
    pub fn last_day(&self) -> NaiveDate {
        let end = self.to.date();
        end.pred_opt().unwrap_or(end)
    }
}

impl AnalyticsQuery {
    /// Resolve the requested range, defaulting to the last
    /// [`DEFAULT_RANGE_DAYS`] days ending `today`.
    pub fn into_range(self, today: NaiveDate) -> FormResult<DateRange> {
        let last_day = match self.to.as_deref() {
            Some(value) => parse_day("to", value)?,
            None => today,
        };
        let first_day = match self.from.as_deref() {
            Some(value) => parse_day("from", value)?,
            None => last_day
                .checked_sub_signed(Duration::days(DEFAULT_RANGE_DAYS - 1))
                .ok_or_else(|| FormError::InvalidValue {
                    field: "to",
                    value: last_day.to_string(),
                })?,
        };

        let span = (last_day - first_day).num_days();
        if !(0..MAX_RANGE_DAYS).contains(&span) {
            return Err(FormError::InvalidValue {
                field: "from",
                value: first_day.to_string(),
            });
        }

        // The range ends at midnight after the last day, which must exist.
        let end = last_day.succ_opt().ok_or_else(|| FormError::InvalidValue {
            field: "to",
            value: last_day.to_string(),
        })?;

        Ok(DateRange {
            from: start_of(first_day),
            to: start_of(end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap_or_default()
    }

    #[test]
    fn default_range_is_last_thirty_days() {
        let range = AnalyticsQuery::default()
            .into_range(day(3, 30))
            .expect("valid");

        assert_eq!(range.first_day(), day(3, 1));
        assert_eq!(range.last_day(), day(3, 30));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = AnalyticsQuery {
            from: Some("2024-03-10".to_string()),
            to: Some("2024-03-01".to_string()),
        };

        assert!(matches!(
            query.into_range(day(3, 30)),
            Err(FormError::InvalidValue { field: "from", .. })
        ));
    }

    #[test]
    fn calendar_edges_are_rejected_without_panicking() {
        let last = AnalyticsQuery {
            from: Some(NaiveDate::MAX.to_string()),
            to: Some(NaiveDate::MAX.to_string()),
        };
        assert!(matches!(
            last.into_range(day(3, 30)),
            Err(FormError::InvalidValue { field: "to", .. })
        ));

        let first = AnalyticsQuery {
            from: None,
            to: Some(NaiveDate::MIN.to_string()),
        };
        assert!(matches!(
            first.into_range(day(3, 30)),
            Err(FormError::InvalidValue { field: "to", .. })
        ));
    }

    #[test]
    fn single_day_range_covers_that_day() {
        let query = AnalyticsQuery {
            from: Some("2024-02-29".to_string()),
            to: Some("2024-02-29".to_string()),
        };

        let range = query.into_range(day(3, 30)).expect("valid");
        assert_eq!(range.first_day(), day(2, 29));
        assert_eq!(range.last_day(), day(2, 29));
        assert_eq!(range.to, start_of(day(3, 1)));
    }
}
