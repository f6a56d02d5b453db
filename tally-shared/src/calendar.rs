/// Calendar arithmetic for schedules and budget windows
///
/// All ledger dates are `NaiveDate`s: expenses, due dates and budget windows
/// are calendar days with no time-of-day or timezone component.
///
/// # Month arithmetic
///
/// Adding months keeps the day-of-month when the target month has it and
/// clamps to the target month's last day otherwise:
///
/// ```text
/// 2024-01-15 + 1 month = 2024-02-15
/// 2024-01-31 + 1 month = 2024-02-29   (leap year)
/// 2023-01-31 + 1 month = 2023-02-28
/// ```
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use tally_shared::calendar::{add_months, month_window};
///
/// let jan_31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(add_months(jan_31, 1), NaiveDate::from_ymd_opt(2024, 2, 29));
///
/// let window = month_window(jan_31).unwrap();
/// assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// assert_eq!(window.end, jan_31);
/// ```

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day in the range
    pub start: NaiveDate,

    /// Last day in the range (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, returning None if `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// Checks whether a day falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Adds whole calendar months to a date, clamping to the month's last day
///
/// Returns None only when the result would fall outside chrono's date range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Computes the calendar month containing `as_of`
///
/// The window runs from the 1st to the last day of that month, inclusive.
pub fn month_window(as_of: NaiveDate) -> Option<DateRange> {
    let start = as_of.with_day(1)?;
    let end = add_months(start, 1)?.checked_sub_days(Days::new(1))?;
    Some(DateRange { start, end })
}
