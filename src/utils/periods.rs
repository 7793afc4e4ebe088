//! Calendar period keys and their bounds.
//!
//! Every date maps to exactly one key per [`Granularity`], and every key maps back
//! to an inclusive `[start, end]` range that contains the date.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::error::PeriodError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Granularity {
    Weekly,
    Monthly,
    Quarterly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Quarterly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
        }
    }

    /// Key of the bucket containing `date`.
    ///
    /// Weekly keys use the ISO week-based year, so 2024-12-30 is `2025-W01`.
    pub fn period_key(self, date: NaiveDateTime) -> String {
        match self {
            Granularity::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Granularity::Monthly => format!("{}-{:02}", date.year(), date.month()),
            Granularity::Quarterly => format!("{}-Q{}", date.year(), quarter_of(date.month())),
        }
    }

    /// Inclusive bounds of a bucket: midnight of its first day through 23:59:59 of its last.
    pub fn period_bounds(self, key: &str) -> Result<(NaiveDateTime, NaiveDateTime), PeriodError> {
        let malformed = || PeriodError {
            key: key.to_string(),
            granularity: self.as_str(),
        };

        let (first_day, next_first_day) = match self {
            Granularity::Weekly => {
                let (year, week) = key.split_once("-W").ok_or_else(malformed)?;
                let year = year.parse::<i32>().map_err(|_| malformed())?;
                let week = week.parse::<u32>().map_err(|_| malformed())?;
                let monday =
                    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(malformed)?;
                (monday, monday + Duration::weeks(1))
            }
            Granularity::Monthly => {
                let (year, month) = key.split_once('-').ok_or_else(malformed)?;
                let year = year.parse::<i32>().map_err(|_| malformed())?;
                let month = month.parse::<u32>().map_err(|_| malformed())?;
                month_span(year, month, 1).ok_or_else(malformed)?
            }
            Granularity::Quarterly => {
                let (year, quarter) = key.split_once("-Q").ok_or_else(malformed)?;
                let year = year.parse::<i32>().map_err(|_| malformed())?;
                let quarter = quarter.parse::<u32>().map_err(|_| malformed())?;
                if !(1..=4).contains(&quarter) {
                    return Err(malformed());
                }
                month_span(year, (quarter - 1) * 3 + 1, 3).ok_or_else(malformed)?
            }
        };

        let start = first_day.and_hms_opt(0, 0, 0).ok_or_else(malformed)?;
        let end = next_first_day.and_hms_opt(0, 0, 0).ok_or_else(malformed)? - Duration::seconds(1);
        Ok((start, end))
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// First day of `month` and first day of the month `months` later.
fn month_span(year: i32, month: u32, months: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let index = month - 1 + months;
    let next = NaiveDate::from_ymd_opt(year + (index / 12) as i32, index % 12 + 1, 1)?;
    Some((first, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_weekly_key_first_monday() {
        let date = at(2024, 1, 1, 9, 30, 0);
        assert_eq!(Granularity::Weekly.period_key(date), "2024-W01");
        let (start, end) = Granularity::Weekly.period_bounds("2024-W01").unwrap();
        assert_eq!(start, at(2024, 1, 1, 0, 0, 0));
        assert_eq!(end, at(2024, 1, 7, 23, 59, 59));
        assert!(start <= date && date <= end);
    }

    #[test]
    fn test_weekly_uses_iso_year() {
        assert_eq!(Granularity::Weekly.period_key(at(2024, 12, 30, 12, 0, 0)), "2025-W01");
        assert_eq!(Granularity::Weekly.period_key(at(2021, 1, 3, 12, 0, 0)), "2020-W53");
        let (start, _) = Granularity::Weekly.period_bounds("2025-W01").unwrap();
        assert_eq!(start, at(2024, 12, 30, 0, 0, 0));
    }

    #[test]
    fn test_monthly_bounds() {
        assert_eq!(Granularity::Monthly.period_key(at(2024, 2, 29, 23, 0, 0)), "2024-02");
        let (start, end) = Granularity::Monthly.period_bounds("2024-02").unwrap();
        assert_eq!(start, at(2024, 2, 1, 0, 0, 0));
        assert_eq!(end, at(2024, 2, 29, 23, 59, 59));

        let (_, end) = Granularity::Monthly.period_bounds("2023-12").unwrap();
        assert_eq!(end, at(2023, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_quarterly_bounds() {
        assert_eq!(Granularity::Quarterly.period_key(at(2024, 3, 31, 0, 0, 0)), "2024-Q1");
        assert_eq!(Granularity::Quarterly.period_key(at(2024, 4, 1, 0, 0, 0)), "2024-Q2");
        assert_eq!(Granularity::Quarterly.period_key(at(2024, 12, 1, 0, 0, 0)), "2024-Q4");

        let (start, end) = Granularity::Quarterly.period_bounds("2024-Q4").unwrap();
        assert_eq!(start, at(2024, 10, 1, 0, 0, 0));
        assert_eq!(end, at(2024, 12, 31, 23, 59, 59));

        let (start, end) = Granularity::Quarterly.period_bounds("2024-Q2").unwrap();
        assert_eq!(start, at(2024, 4, 1, 0, 0, 0));
        assert_eq!(end, at(2024, 6, 30, 23, 59, 59));
    }

    #[test]
    fn test_round_trip_over_two_years() {
        let mut date = at(2023, 1, 1, 13, 45, 10);
        let last = at(2025, 1, 10, 0, 0, 0);
        while date < last {
            for granularity in Granularity::ALL {
                let key = granularity.period_key(date);
                let (start, end) = granularity.period_bounds(&key).unwrap();
                assert!(start <= date && date <= end, "{} {} {}", granularity, key, date);
            }
            date += Duration::hours(19);
        }
    }

    #[test]
    fn test_malformed_keys() {
        assert!(Granularity::Weekly.period_bounds("2024-01").is_err());
        assert!(Granularity::Weekly.period_bounds("2024-W54").is_err());
        assert!(Granularity::Monthly.period_bounds("2024-13").is_err());
        assert!(Granularity::Monthly.period_bounds("2024-W01").is_err());
        assert!(Granularity::Quarterly.period_bounds("2024-Q5").is_err());
        assert_eq!(
            Granularity::Quarterly.period_bounds("Q1").unwrap_err(),
            PeriodError {
                key: "Q1".to_string(),
                granularity: "quarterly",
            }
        );
    }
}
