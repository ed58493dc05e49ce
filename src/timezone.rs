use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezone(canonical_timezone.to_owned())
    })
}

/// The UTC offset that `timezone` observes at the instant `at`.
pub fn get_offset_at(timezone: &Tz, at: OffsetDateTime) -> UtcOffset {
    timezone.get_offset_utc(&at).to_utc()
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};

    use crate::Error;

    use super::{get_offset_at, get_timezone};

    #[test]
    fn get_timezone_succeeds_on_canonical_name() {
        assert!(get_timezone("Pacific/Auckland").is_ok());
    }

    #[test]
    fn get_timezone_fails_on_unknown_name() {
        let result = get_timezone("Middle/Earth");

        assert_eq!(
            result.err(),
            Some(Error::InvalidTimezone("Middle/Earth".to_owned()))
        );
    }

    #[test]
    fn offset_follows_daylight_saving() {
        let timezone = get_timezone("Pacific/Auckland").unwrap();

        let winter = get_offset_at(timezone, datetime!(2025-07-01 0:00 UTC));
        let summer = get_offset_at(timezone, datetime!(2025-01-01 0:00 UTC));

        assert_eq!(winter, UtcOffset::from_hms(12, 0, 0).unwrap());
        assert_eq!(summer, UtcOffset::from_hms(13, 0, 0).unwrap());
    }
}
