//! License lifecycle classification.
//!
//! A license's `end_date` is a calendar date; "days left" counts from an
//! explicit `now` up to midnight UTC at the start of that date, rounded
//! up. The same thresholds drive list coloring, the dashboard summary,
//! and the expiring/expired report windows, so the three surfaces can
//! never disagree about where a boundary falls.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::types::LicenseStatus;

/// Licenses within this many days of expiry are urgent.
pub const CRITICAL_DAYS: i64 = 7;

/// Licenses within this many days of expiry appear in the
/// expiring-soon report.
pub const EXPIRING_SOON_DAYS: i64 = 30;

const SECS_PER_DAY: i64 = 86_400;

/// Whole days until `end_date`, rounded up (toward the future).
///
/// A license expiring tomorrow has 1 day left regardless of the time of
/// day; one that expired yesterday has -1.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use lichub_common::expiry::days_left;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// assert_eq!(days_left(end, now), 5);
/// ```
pub fn days_left(end_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let end = end_date.and_time(NaiveTime::MIN).and_utc();
    let secs = (end - now).num_seconds();
    let mut days = secs.div_euclid(SECS_PER_DAY);
    if secs.rem_euclid(SECS_PER_DAY) != 0 {
        days += 1;
    }
    days
}

/// Map a days-left count onto a lifecycle status.
pub fn status_for(days_left: i64) -> LicenseStatus {
    if days_left < 0 {
        LicenseStatus::Expired
    } else if days_left <= CRITICAL_DAYS {
        LicenseStatus::Critical
    } else if days_left <= EXPIRING_SOON_DAYS {
        LicenseStatus::Warning
    } else {
        LicenseStatus::Normal
    }
}

/// Classify a license end date against an explicit `now`.
pub fn classify(end_date: NaiveDate, now: DateTime<Utc>) -> (i64, LicenseStatus) {
    let days = days_left(end_date, now);
    (days, status_for(days))
}

/// Inclusive `[today, today + EXPIRING_SOON_DAYS]` date window for the
/// expiring-soon report. The expired report is `end_date < today`.
pub fn expiring_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(EXPIRING_SOON_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn yesterday_is_expired() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 6, 14), now);
        assert_eq!(days, -1);
        assert_eq!(status, LicenseStatus::Expired);
    }

    #[test]
    fn today_is_critical_not_expired() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 6, 15), now);
        assert_eq!(days, 0);
        assert_eq!(status, LicenseStatus::Critical);
    }

    #[test]
    fn seven_days_out_is_critical() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 6, 22), now);
        assert_eq!(days, 7);
        assert_eq!(status, LicenseStatus::Critical);
    }

    #[test]
    fn eight_days_out_is_warning() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 6, 23), now);
        assert_eq!(days, 8);
        assert_eq!(status, LicenseStatus::Warning);
    }

    #[test]
    fn thirty_days_out_is_warning() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 7, 15), now);
        assert_eq!(days, 30);
        assert_eq!(status, LicenseStatus::Warning);
    }

    #[test]
    fn thirty_one_days_out_is_normal() {
        let now = noon(2024, 6, 15);
        let (days, status) = classify(date(2024, 7, 16), now);
        assert_eq!(days, 31);
        assert_eq!(status, LicenseStatus::Normal);
    }

    #[test]
    fn midnight_now_counts_exact_days() {
        // 2024-01-01 .. 2024-01-10 license observed at 2024-01-05 00:00.
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let (days, status) = classify(date(2024, 1, 10), now);
        assert_eq!(days, 5);
        assert_eq!(status, LicenseStatus::Critical);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let today = date(2024, 6, 15);
        let (from, to) = expiring_window(today);
        assert_eq!(from, today);
        assert_eq!(to, date(2024, 7, 15));
        // A license on the upper bound classifies as warning, matching
        // its membership in the expiring-soon report.
        assert_eq!(status_for(days_left(to, noon(2024, 6, 15))), LicenseStatus::Warning);
    }
}
