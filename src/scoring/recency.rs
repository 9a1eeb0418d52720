//! Freshness buckets for web evidence.

use chrono::{Local, NaiveDate};

/// Score given to results whose age is unknown.
pub const NEUTRAL_RECENCY: f64 = 0.5;

const BUCKETS: &[(i64, f64)] = &[(1, 1.0), (7, 0.9), (30, 0.8), (90, 0.7), (365, 0.6)];

/// Recency of a `YYYY-MM-DD` date relative to the local calendar day.
pub fn recency_score(published_date: Option<&str>) -> f64 {
    recency_score_at(published_date, Local::now().date_naive())
}

/// Recency of a `YYYY-MM-DD` date relative to `today`.
///
/// Missing, blank and unparseable dates score [`NEUTRAL_RECENCY`]. Dates in
/// the future count as fresh.
pub fn recency_score_at(published_date: Option<&str>, today: NaiveDate) -> f64 {
    let Some(raw) = published_date.map(str::trim).filter(|s| !s.is_empty()) else {
        return NEUTRAL_RECENCY;
    };
    let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        tracing::trace!(raw, "unparseable published date");
        return NEUTRAL_RECENCY;
    };
    let days_old = (today - date).num_days();
    BUCKETS
        .iter()
        .find(|(max_days, _)| days_old <= *max_days)
        .map_or(NEUTRAL_RECENCY, |(_, score)| *score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default()
    }

    fn days_ago(n: i64) -> String {
        (today() - chrono::Duration::days(n)).format("%Y-%m-%d").to_string()
    }

    #[test]
    fn buckets_by_age() {
        let cases = [
            (0, 1.0),
            (1, 1.0),
            (2, 0.9),
            (7, 0.9),
            (8, 0.8),
            (30, 0.8),
            (31, 0.7),
            (90, 0.7),
            (91, 0.6),
            (365, 0.6),
            (366, 0.5),
            (4000, 0.5),
        ];
        for (age, expected) in cases {
            let date = days_ago(age);
            assert_eq!(recency_score_at(Some(&date), today()), expected, "{age} days");
        }
    }

    #[test]
    fn future_dates_are_fresh() {
        assert_eq!(recency_score_at(Some("2024-07-15"), today()), 1.0);
    }

    #[test]
    fn unknown_dates_are_neutral() {
        for raw in [None, Some(""), Some("   "), Some("yesterday"), Some("2024/06/01"), Some("2024-13-40")] {
            assert_eq!(recency_score_at(raw, today()), NEUTRAL_RECENCY);
        }
    }

    #[test]
    fn wall_clock_variant_handles_today() {
        let now = Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(recency_score(Some(&now)), 1.0);
        assert_eq!(recency_score(None), NEUTRAL_RECENCY);
    }
}
