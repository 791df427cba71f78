//! Calendar-month date arithmetic for vesting schedules.
//!
//! Vesting runs on calendar months, not fixed-length periods: a grant dated
//! Jan 31 cliffs on the last day of the target month when the day would
//! otherwise overflow (Jan 31 + 1 month = Feb 28/29).

use chrono::{Datelike, Months, NaiveDate};

/// Advances a date by whole calendar months, clamping the day of month to the
/// target month's last day when needed.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Number of full months elapsed between two dates, floored at zero.
///
/// A month counts only once the day-of-month has been reached: Jan 15 to
/// Feb 14 is 0 full months, Jan 15 to Feb 15 is 1.
pub fn months_diff(from: NaiveDate, to: NaiveDate) -> u32 {
    let years = to.year() - from.year();
    let months = to.month() as i32 - from.month() as i32;
    let mut total = years * 12 + months;

    if to.day() < from.day() {
        total -= 1;
    }
    total.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_months_simple() {
        assert_eq!(add_months(date(2024, 1, 1), 12), date(2025, 1, 1));
        assert_eq!(add_months(date(2024, 1, 1), 48), date(2028, 1, 1));
        assert_eq!(add_months(date(2024, 11, 15), 3), date(2025, 2, 15));
    }

    #[test]
    fn add_months_clamps_day_overflow() {
        // Jan 31 + 1 month lands on the last day of February
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 8, 31), 1), date(2024, 9, 30));
    }

    #[test]
    fn months_diff_full_months_only() {
        assert_eq!(months_diff(date(2024, 1, 1), date(2024, 6, 15)), 5);
        assert_eq!(months_diff(date(2024, 1, 1), date(2025, 1, 1)), 12);
        assert_eq!(months_diff(date(2024, 1, 15), date(2024, 2, 14)), 0);
        assert_eq!(months_diff(date(2024, 1, 15), date(2024, 2, 15)), 1);
    }

    #[test]
    fn months_diff_floors_at_zero() {
        assert_eq!(months_diff(date(2024, 6, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn months_diff_across_years() {
        assert_eq!(months_diff(date(2024, 1, 1), date(2026, 1, 1)), 24);
        assert_eq!(months_diff(date(2023, 11, 30), date(2024, 2, 29)), 2);
    }
}
