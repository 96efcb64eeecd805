//! Report date ranges and the tabular document handed to the renderer.

use chrono::{Datelike, NaiveDate};

use crate::error::ApiError;

/// A validated reporting window. Reports only cover the current calendar
/// month, and never reach into the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ApiError> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(ApiError::InvalidInput(
                    "start and end dates are required".into(),
                ))
            }
        };
        if end < start {
            return Err(ApiError::InvalidInput(
                "end date cannot be before start date".into(),
            ));
        }
        let in_current_month = |d: NaiveDate| {
            d.year() == today.year() && d.month() == today.month() && d <= today
        };
        if !in_current_month(start) || !in_current_month(end) {
            return Err(ApiError::InvalidInput(
                "dates must fall within the current month and not be in the future".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Four-column table fed to the document engine. Both report kinds fit the
/// same shape, so the engine stays ignorant of what is being reported.
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub subtitle: String,
    pub columns: [&'static str; 4],
    pub rows: Vec<[String; 4]>,
    pub summary: Option<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn accepts_a_range_inside_the_current_month() {
        let today = d(2026, 8, 20);
        let range = ReportRange::resolve(Some(d(2026, 8, 1)), Some(d(2026, 8, 15)), today).unwrap();
        assert_eq!(range.start, d(2026, 8, 1));
        assert_eq!(range.end, d(2026, 8, 15));
        assert_eq!(range.label(), "2026-08-01 to 2026-08-15");
    }

    #[test]
    fn both_dates_are_required() {
        let today = d(2026, 8, 20);
        for (s, e) in [(None, None), (Some(d(2026, 8, 1)), None), (None, Some(d(2026, 8, 15)))] {
            assert!(matches!(
                ReportRange::resolve(s, e, today),
                Err(ApiError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn rejects_end_before_start() {
        let today = d(2026, 8, 20);
        let err = ReportRange::resolve(Some(d(2026, 8, 15)), Some(d(2026, 8, 1)), today);
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn rejects_the_previous_month() {
        let today = d(2026, 8, 20);
        let err = ReportRange::resolve(Some(d(2026, 7, 1)), Some(d(2026, 7, 15)), today);
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn rejects_future_dates_even_inside_the_month() {
        let today = d(2026, 8, 10);
        let err = ReportRange::resolve(Some(d(2026, 8, 1)), Some(d(2026, 8, 15)), today);
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn rejects_the_next_year() {
        let today = d(2026, 8, 20);
        let err = ReportRange::resolve(Some(d(2027, 1, 15)), Some(d(2027, 1, 15)), today);
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }
}
