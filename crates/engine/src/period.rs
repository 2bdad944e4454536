//! Period presets and the date ranges derived from them.
//!
//! Every preset is "from X through today": the derived range only ever sets
//! the lower bound. An unset upper bound is sent to the API as nothing at all
//! and read there as "up to today".

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Date format used by the API and by date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Mutually exclusive preset selector of the filter bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1d")]
    Today,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "1m")]
    LastMonth,
    #[serde(rename = "custom")]
    Custom,
}

impl Period {
    /// Button order of the filter bar.
    pub const ALL: [Period; 5] = [
        Period::All,
        Period::Today,
        Period::LastWeek,
        Period::LastMonth,
        Period::Custom,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "1d",
            Self::LastWeek => "7d",
            Self::LastMonth => "1m",
            Self::Custom => "custom",
        }
    }

    /// Short label used on the preset buttons.
    pub fn button_label(self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Today => "1 Day",
            Self::LastWeek => "7 Days",
            Self::LastMonth => "1 Month",
            Self::Custom => "Custom",
        }
    }

    /// Heading shown next to the calendar icon.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Time",
            Self::Today => "Today",
            Self::LastWeek => "Last 7 Days",
            Self::LastMonth => "Last 30 Days",
            Self::Custom => "Custom Date",
        }
    }
}

/// Inclusive date bounds. `None` means unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    pub const fn starting(from: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// `2024-03-01 to 2024-03-15`, or `Select date` when nothing is set.
    pub fn label(&self) -> String {
        let from = self
            .from
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "Select date".to_string());
        match self.to {
            Some(to) => format!("{from} to {}", to.format(DATE_FORMAT)),
            None => from,
        }
    }
}

/// The calendar month shown by the custom date picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!("{year}-{month}")));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidMonth(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// First day of the month, i.e. `{year}-{month:02}-01`.
    pub fn first_day(self) -> NaiveDate {
        // `new`/`of` only build months chrono can represent.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn label(self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// Derives the lower bound of a preset relative to `reference` (today).
///
/// The returned range never has an upper bound. For [`Period::LastMonth`]
/// the day of month is clamped to the end of a shorter target month, so
/// `2024-03-31` goes back to `2024-02-29`.
pub fn derive_period_range(period: Period, reference: NaiveDate, displayed: YearMonth) -> DateRange {
    let from = match period {
        Period::All => None,
        Period::Today => Some(reference),
        Period::LastWeek => reference.checked_sub_days(Days::new(7)),
        Period::LastMonth => reference.checked_sub_months(Months::new(1)),
        Period::Custom => Some(displayed.first_day()),
    };
    DateRange { from, to: None }
}

/// Parses a `YYYY-MM-DD` date input; blank input means "unset".
pub fn parse_date_input(input: &str) -> ResultEngine<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| EngineError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_week_goes_back_seven_days() {
        let range = derive_period_range(
            Period::LastWeek,
            date(2024, 3, 15),
            YearMonth::of(date(2024, 3, 15)),
        );
        assert_eq!(range.from, Some(date(2024, 3, 8)));
        assert_eq!(range.to, None);
    }

    #[test]
    fn last_week_crosses_month_boundary() {
        let range = derive_period_range(
            Period::LastWeek,
            date(2024, 3, 3),
            YearMonth::of(date(2024, 3, 3)),
        );
        assert_eq!(range.from, Some(date(2024, 2, 25)));
    }

    #[test]
    fn last_month_clamps_to_end_of_shorter_month() {
        let displayed = YearMonth::of(date(2024, 3, 31));
        let leap = derive_period_range(Period::LastMonth, date(2024, 3, 31), displayed);
        assert_eq!(leap.from, Some(date(2024, 2, 29)));

        let displayed = YearMonth::of(date(2023, 3, 31));
        let common = derive_period_range(Period::LastMonth, date(2023, 3, 31), displayed);
        assert_eq!(common.from, Some(date(2023, 2, 28)));

        let displayed = YearMonth::of(date(2024, 1, 15));
        let january = derive_period_range(Period::LastMonth, date(2024, 1, 15), displayed);
        assert_eq!(january.from, Some(date(2023, 12, 15)));
    }

    #[test]
    fn today_and_all() {
        let today = date(2024, 3, 15);
        let displayed = YearMonth::of(today);
        assert_eq!(
            derive_period_range(Period::Today, today, displayed),
            DateRange::starting(today)
        );
        assert!(derive_period_range(Period::All, today, displayed).is_unbounded());
    }

    #[test]
    fn custom_starts_on_first_of_displayed_month() {
        let displayed = YearMonth::new(2023, 7).unwrap();
        let range = derive_period_range(Period::Custom, date(2024, 3, 15), displayed);
        assert_eq!(range.from, Some(date(2023, 7, 1)));
        assert_eq!(range.to, None);
    }

    #[test]
    fn year_month_navigation_wraps_years() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(YearMonth::new(2024, 1).unwrap().prev(), dec);
        assert!(YearMonth::new(2024, 13).is_err());
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn date_input_parsing() {
        assert_eq!(parse_date_input("  "), Ok(None));
        assert_eq!(parse_date_input("2024-02-29"), Ok(Some(date(2024, 2, 29))));
        assert!(parse_date_input("2023-02-29").is_err());
        assert!(parse_date_input("15/03/2024").is_err());
    }

    #[test]
    fn range_label() {
        assert_eq!(DateRange::unbounded().label(), "Select date");
        let range = DateRange {
            from: Some(date(2024, 3, 1)),
            to: Some(date(2024, 3, 15)),
        };
        assert_eq!(range.label(), "2024-03-01 to 2024-03-15");
    }
}
