//! Date and time display utilities.

use std::fmt;

use jiff::{civil::Date, tz::TimeZone, Timestamp};

/// A wrapper around `Timestamp` that formats it in the system timezone.
///
/// The display format follows the pattern `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// A calendar date with its weekday, e.g. `2025-03-07 (Fri)`.
pub struct CalendarDate<'a>(pub &'a Date);

impl fmt::Display for CalendarDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.strftime("%Y-%m-%d (%a)"))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_calendar_date_includes_weekday() {
        let day = date(2025, 3, 7);
        assert_eq!(CalendarDate(&day).to_string(), "2025-03-07 (Fri)");
    }

    #[test]
    fn test_local_datetime_shape() {
        let ts = Timestamp::from_second(1_640_995_200).unwrap();
        let text = LocalDateTime(&ts).to_string();
        // Date part depends on the system zone; the layout does not.
        assert_eq!(text.split(' ').next().unwrap().len(), 10);
        assert_eq!(text.split(' ').nth(1).unwrap().len(), 8);
    }
}
