//! Fiscal window resolution: default report dates and editable date bounds
//! derived from the active accounting year.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::AccountingYear;

/// Allowed bounds for user-editable report dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Start of the accounting year, always enforced
    pub min: NaiveDate,
    /// End of the accounting year, only enforced once the year is closed
    pub max: Option<NaiveDate>,
}

/// Which boundary a clamped date was moved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Min,
    Max,
}

impl DateWindow {
    /// Check if a date lies inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min && self.max.map_or(true, |max| date <= max)
    }

    /// Move a date to the nearest boundary when it falls outside
    pub fn clamp(&self, date: NaiveDate) -> (NaiveDate, Option<Boundary>) {
        if date < self.min {
            return (self.min, Some(Boundary::Min));
        }
        match self.max {
            Some(max) if date > max => (max, Some(Boundary::Max)),
            _ => (date, None),
        }
    }

    /// Value for a date input's `min` attribute
    pub fn min_attr(&self) -> String {
        self.min.format("%Y-%m-%d").to_string()
    }

    /// Value for a date input's `max` attribute (empty when open-ended)
    pub fn max_attr(&self) -> String {
        self.max.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Editable bounds for the given year
pub fn resolve_bounds(year: &AccountingYear) -> DateWindow {
    DateWindow {
        min: year.from_year_month,
        max: year.has_closed.then_some(year.to_year_month),
    }
}

/// Default as-on / "to" date
///
/// A closed year is frozen at its end. An open year defaults to today,
/// unless its nominal end has already passed.
pub fn resolve_default_date(year: &AccountingYear, today: NaiveDate) -> NaiveDate {
    if year.has_closed {
        year.to_year_month
    } else {
        today.min(year.to_year_month)
    }
}

/// Default from/to pair for range reports
pub fn resolve_default_range(year: &AccountingYear, today: NaiveDate) -> DateRange {
    DateRange {
        from: year.from_year_month,
        to: resolve_default_date(year, today),
    }
}

/// Today's date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole calendar months from `from`'s month to `to`'s month
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Everything a report form needs to know about the active year
#[derive(Debug, Clone, Serialize)]
pub struct FiscalSummary {
    pub year: AccountingYear,
    pub window: DateWindow,
    pub default_date: NaiveDate,
    pub default_range: DateRange,
}

impl FiscalSummary {
    pub fn resolve(year: AccountingYear, today: NaiveDate) -> Self {
        let window = resolve_bounds(&year);
        let default_date = resolve_default_date(&year, today);
        let default_range = resolve_default_range(&year, today);
        Self {
            year,
            window,
            default_date,
            default_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn year(has_closed: bool) -> AccountingYear {
        AccountingYear {
            id: "1".to_string(),
            from_year_month: ymd(2024, 4, 1),
            to_year_month: ymd(2025, 3, 31),
            has_closed,
            status: true,
        }
    }

    #[test]
    fn test_open_year_defaults_to_today() {
        let range = resolve_default_range(&year(false), ymd(2024, 11, 20));
        assert_eq!(range, DateRange { from: ymd(2024, 4, 1), to: ymd(2024, 11, 20) });
    }

    #[test]
    fn test_open_year_past_its_end_defaults_to_end() {
        assert_eq!(resolve_default_date(&year(false), ymd(2025, 6, 1)), ymd(2025, 3, 31));
    }

    #[test]
    fn test_closed_year_defaults_to_end() {
        let range = resolve_default_range(&year(true), ymd(2024, 11, 20));
        assert_eq!(range, DateRange { from: ymd(2024, 4, 1), to: ymd(2025, 3, 31) });
    }

    #[test]
    fn test_bounds() {
        assert_eq!(resolve_bounds(&year(true)).max, Some(ymd(2025, 3, 31)));
        assert_eq!(resolve_bounds(&year(false)).max, None);
        assert_eq!(resolve_bounds(&year(false)).min, ymd(2024, 4, 1));
    }

    #[test]
    fn test_window_clamp_and_contains() {
        let closed = resolve_bounds(&year(true));
        assert_eq!(closed.clamp(ymd(2024, 1, 5)), (ymd(2024, 4, 1), Some(Boundary::Min)));
        assert_eq!(closed.clamp(ymd(2025, 4, 5)), (ymd(2025, 3, 31), Some(Boundary::Max)));
        assert_eq!(closed.clamp(ymd(2024, 8, 15)), (ymd(2024, 8, 15), None));
        assert!(!closed.contains(ymd(2025, 4, 1)));

        let open = resolve_bounds(&year(false));
        assert!(open.contains(ymd(2030, 1, 1)));
        assert_eq!(open.max_attr(), "");
        assert_eq!(closed.max_attr(), "2025-03-31");
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(ymd(2024, 1, 1), ymd(2025, 2, 1)), 13);
        assert_eq!(months_between(ymd(2024, 4, 1), ymd(2025, 3, 31)), 11);
        assert_eq!(months_between(ymd(2024, 4, 30), ymd(2024, 4, 1)), 0);
    }

    #[test]
    fn test_summary() {
        let summary = FiscalSummary::resolve(year(false), ymd(2024, 11, 20));
        assert_eq!(summary.default_date, ymd(2024, 11, 20));
        assert_eq!(summary.window.max, None);
    }

    fn any_year() -> impl Strategy<Value = (AccountingYear, NaiveDate)> {
        (2000i32..2040, 1u32..=12, 0i64..730, any::<bool>()).prop_map(|(y, m, offset, closed)| {
            let from = ymd(y, m, 1);
            let to = crate::de::last_day_of_month(ymd(y + 1, m, 1).pred_opt().unwrap()).unwrap();
            let today = from + chrono::Duration::days(offset);
            (
                AccountingYear {
                    id: "p".to_string(),
                    from_year_month: from,
                    to_year_month: to,
                    has_closed: closed,
                    status: true,
                },
                today,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_bounds_follow_closed_flag((year, _today) in any_year()) {
            let window = resolve_bounds(&year);
            prop_assert_eq!(window.min, year.from_year_month);
            if year.has_closed {
                prop_assert_eq!(window.max, Some(year.to_year_month));
            } else {
                prop_assert_eq!(window.max, None);
            }
        }

        #[test]
        fn prop_default_date((year, today) in any_year()) {
            let date = resolve_default_date(&year, today);
            if year.has_closed {
                prop_assert_eq!(date, year.to_year_month);
            } else {
                prop_assert_eq!(date, today.min(year.to_year_month));
            }
        }
    }
}
