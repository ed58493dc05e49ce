//! Calendar windows (today, this month, this year) resolved against "now".
//!
//! A window is the local calendar day, month or year containing an instant.
//! Local time is taken from a canonical timezone, and each boundary is the
//! local midnight converted to UTC with the offset in effect at that
//! midnight, so a month that spans a daylight saving change still starts and
//! ends on local midnights.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use time_tz::Tz;

use crate::{Error, timezone::get_offset_at};

/// The calendar period to total transactions over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Window {
    /// The current local calendar day.
    Day,
    /// The current local calendar month.
    Month,
    /// The current local calendar year.
    Year,
}

impl Window {
    /// Every window, from narrowest to widest.
    pub const ALL: [Window; 3] = [Window::Day, Window::Month, Window::Year];

    /// The lower case name used on the command line and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// A label for presenting the window's total.
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Today",
            Self::Month => "This month",
            Self::Year => "This year",
        }
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!(
                "unknown window \"{other}\", expected one of day, month or year"
            )),
        }
    }
}

/// A half-open range of instants, `start <= t < end`, both in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    /// The first instant in the window.
    pub start: OffsetDateTime,
    /// The first instant after the window.
    pub end: OffsetDateTime,
}

impl WindowRange {
    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Resolve `window` to the range of instants it covers for `now` in `timezone`.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if a boundary of the window cannot be
/// represented, e.g. the end of the year 9999.
pub fn compute_window_range(
    window: Window,
    now: OffsetDateTime,
    timezone: &Tz,
) -> Result<WindowRange, Error> {
    let local_date = now
        .checked_to_offset(get_offset_at(timezone, now))
        .ok_or(Error::DateOutOfRange)?
        .date();

    let (start, end) = match window {
        Window::Day => day_bounds(local_date),
        Window::Month => month_bounds(local_date.year(), local_date.month()),
        Window::Year => year_bounds(local_date.year()),
    }
    .ok_or_else(|| {
        tracing::warn!("The {window} window containing {now} is out of range");
        Error::DateOutOfRange
    })?;

    Ok(WindowRange {
        start: local_midnight(start, timezone)?,
        end: local_midnight(end, timezone)?,
    })
}

fn day_bounds(date: Date) -> Option<(Date, Date)> {
    Some((date, date.next_day()?))
}

fn month_bounds(year: i32, month: Month) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, month, 1).ok()?;
    let end = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        month => Date::from_calendar_date(year, month.next(), 1),
    }
    .ok()?;

    Some((start, end))
}

fn year_bounds(year: i32) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, Month::January, 1).ok()?;
    let end = Date::from_calendar_date(year + 1, Month::January, 1).ok()?;

    Some((start, end))
}

/// The UTC instant of midnight at the start of `date` in `timezone`.
fn local_midnight(date: Date, timezone: &Tz) -> Result<OffsetDateTime, Error> {
    let midnight = PrimitiveDateTime::new(date, Time::MIDNIGHT);

    // The offset at UTC midnight is only a first guess. Looking the offset up
    // again at the guessed instant settles on the offset local midnight uses.
    let guess = midnight.assume_offset(get_offset_at(timezone, midnight.assume_utc()));
    let offset = get_offset_at(timezone, guess);

    midnight
        .assume_offset(offset)
        .checked_to_offset(UtcOffset::UTC)
        .ok_or(Error::DateOutOfRange)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{Error, timezone::get_timezone};

    use super::{Window, WindowRange, compute_window_range};

    #[test]
    fn day_window_in_utc() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(2025-03-15 13:45 UTC);

        let range = compute_window_range(Window::Day, now, utc).unwrap();

        assert_eq!(
            range,
            WindowRange {
                start: datetime!(2025-03-15 0:00 UTC),
                end: datetime!(2025-03-16 0:00 UTC),
            }
        );
    }

    #[test]
    fn month_window_in_utc_wraps_december() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(2024-12-31 23:59:59 UTC);

        let range = compute_window_range(Window::Month, now, utc).unwrap();

        assert_eq!(range.start, datetime!(2024-12-01 0:00 UTC));
        assert_eq!(range.end, datetime!(2025-01-01 0:00 UTC));
    }

    #[test]
    fn month_window_handles_leap_february() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(2024-02-29 12:00 UTC);

        let range = compute_window_range(Window::Month, now, utc).unwrap();

        assert_eq!(range.start, datetime!(2024-02-01 0:00 UTC));
        assert_eq!(range.end, datetime!(2024-03-01 0:00 UTC));
    }

    #[test]
    fn year_window_in_utc() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(2025-06-30 8:00 UTC);

        let range = compute_window_range(Window::Year, now, utc).unwrap();

        assert_eq!(range.start, datetime!(2025-01-01 0:00 UTC));
        assert_eq!(range.end, datetime!(2026-01-01 0:00 UTC));
    }

    #[test]
    fn day_window_uses_local_date() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        // 12:00 UTC on the 15th is 01:00 NZDT on the 16th.
        let now = datetime!(2025-01-15 12:00 UTC);

        let range = compute_window_range(Window::Day, now, auckland).unwrap();

        assert_eq!(range.start, datetime!(2025-01-15 11:00 UTC));
        assert_eq!(range.end, datetime!(2025-01-16 11:00 UTC));
    }

    #[test]
    fn month_window_spanning_daylight_saving_change() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        // Daylight saving ended in New Zealand on 6 April 2025.
        let now = datetime!(2025-04-20 0:00 UTC);

        let range = compute_window_range(Window::Month, now, auckland).unwrap();

        assert_eq!(range.start, datetime!(2025-03-31 11:00 UTC));
        assert_eq!(range.end, datetime!(2025-04-30 12:00 UTC));
    }

    #[test]
    fn windows_are_nested() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();
        let now = datetime!(2025-09-28 14:30 UTC);

        let day = compute_window_range(Window::Day, now, auckland).unwrap();
        let month = compute_window_range(Window::Month, now, auckland).unwrap();
        let year = compute_window_range(Window::Year, now, auckland).unwrap();

        assert!(day.contains(now) && month.contains(now) && year.contains(now));
        assert!(month.start <= day.start && day.end <= month.end);
        assert!(year.start <= month.start && month.end <= year.end);
    }

    #[test]
    fn contains_is_half_open() {
        let range = WindowRange {
            start: datetime!(2025-01-01 0:00 UTC),
            end: datetime!(2025-01-02 0:00 UTC),
        };

        assert!(range.contains(datetime!(2025-01-01 0:00 UTC)));
        assert!(!range.contains(datetime!(2025-01-02 0:00 UTC)));
    }

    #[test]
    fn parses_window_names() {
        assert_eq!("Day".parse::<Window>(), Ok(Window::Day));
        assert_eq!(" month".parse::<Window>(), Ok(Window::Month));
        assert_eq!("year".parse::<Window>(), Ok(Window::Year));
        assert!("week".parse::<Window>().is_err());
    }

    #[test]
    fn windows_at_the_end_of_the_calendar_are_out_of_range() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(9999-12-31 12:00 UTC);

        for window in Window::ALL {
            assert_eq!(
                compute_window_range(window, now, utc),
                Err(Error::DateOutOfRange),
                "{window}"
            );
        }
    }

    #[test]
    fn year_window_in_the_last_year_is_out_of_range() {
        let utc = get_timezone("Etc/UTC").unwrap();

        let result = compute_window_range(Window::Year, datetime!(9999-06-01 0:00 UTC), utc);

        assert_eq!(result, Err(Error::DateOutOfRange));
    }

    #[test]
    fn local_date_past_the_end_of_the_calendar_is_out_of_range() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        // 23:00 UTC on the last day is already the year 10000 in Auckland.
        let result = compute_window_range(Window::Day, datetime!(9999-12-31 23:00 UTC), auckland);

        assert_eq!(result, Err(Error::DateOutOfRange));
    }

    #[test]
    fn month_window_before_the_last_month_is_in_range() {
        let utc = get_timezone("Etc/UTC").unwrap();
        let now = datetime!(9999-11-15 0:00 UTC);

        let range = compute_window_range(Window::Month, now, utc).unwrap();

        assert_eq!(range.start, datetime!(9999-11-01 0:00 UTC));
        assert_eq!(range.end, datetime!(9999-12-01 0:00 UTC));
    }
}
