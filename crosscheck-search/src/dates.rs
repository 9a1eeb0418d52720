//! Publication-date normalisation to `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Normalise a date as found in page metadata or engine JSON.
///
/// Accepts RFC 3339, RFC 2822, naive ISO date-times and a handful of
/// written-out forms. Returns `None` for anything else.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| DateTime::parse_from_rfc2822(raw).map(|dt| dt.date_naive()))
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        })
        .or_else(|| {
            // ISO date followed by anything (timezone names, fractional junk).
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })?;

    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_forms() {
        let cases = [
            ("2024-03-05", "2024-03-05"),
            ("2024-03-05T10:20:30Z", "2024-03-05"),
            ("2024-03-05T10:20:30+02:00", "2024-03-05"),
            ("2024-03-05T10:20:30", "2024-03-05"),
            ("2024-03-05 10:20:30.123", "2024-03-05"),
            ("Tue, 5 Mar 2024 10:20:30 GMT", "2024-03-05"),
            ("March 5, 2024", "2024-03-05"),
            ("5 Mar 2024", "2024-03-05"),
            ("2024/03/05", "2024-03-05"),
            ("2024-03-05T10:20:30 UTC", "2024-03-05"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_date(input).as_deref(), Some(expected), "{input}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_date("").is_none());
        assert!(normalize_date("yesterday").is_none());
        assert!(normalize_date("2024-13-45").is_none());
    }
}
