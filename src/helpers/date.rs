//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Front-matter dates are free-form; these are the shapes we can display
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parse a front-matter date string into a calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Format a front-matter date for display, leaving unparseable input as-is
///
/// # Examples
/// ```ignore
/// display_date("2024-01-15", "%d/%m/%Y") // -> "15/01/2024"
/// ```
pub fn display_date(raw: &str, format: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(format).to_string(),
        None => raw.trim().to_string(),
    }
}

/// Current year in the site's timezone
pub fn current_year<Tz: TimeZone>(tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    Utc::now().with_timezone(tz).format("%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_iso_date() {
        assert_eq!(display_date("2024-01-15", "%d/%m/%Y"), "15/01/2024");
        assert_eq!(display_date("2024-01-15 10:30:00", "%d/%m/%Y"), "15/01/2024");
        assert_eq!(display_date("2024-01-15T10:30:00-03:00", "%d/%m/%Y"), "15/01/2024");
    }

    #[test]
    fn test_display_unparseable_date() {
        assert_eq!(display_date(" Páscoa 2024 ", "%d/%m/%Y"), "Páscoa 2024");
    }

    #[test]
    fn test_current_year() {
        let year = current_year(&chrono_tz::America::Bahia);
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }
}
