//! Rolling retention window for nutrition logs.

use chrono::{Duration, NaiveDate};

use super::types::NutritionLog;
use crate::clock::{format_date, parse_date};

/// Logs older than this many days are dropped on every append.
pub const DEFAULT_RETENTION_DAYS: i64 = 365;

/// Oldest calendar day still retained. A window reaching past the earliest
/// representable date keeps everything; a negative window counts as zero.
pub fn retention_cutoff(today: NaiveDate, retention_days: i64) -> NaiveDate {
    Duration::try_days(retention_days.max(0))
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN)
}

/// Keep only logs dated on or after the cutoff.
///
/// Logs whose date does not parse as `YYYY-MM-DD` can never be aggregated and are
/// dropped as well.
pub fn apply_retention(
    logs: Vec<NutritionLog>,
    today: NaiveDate,
    retention_days: i64,
) -> Vec<NutritionLog> {
    let cutoff = retention_cutoff(today, retention_days);
    let before = logs.len();

    let kept: Vec<NutritionLog> = logs
        .into_iter()
        .filter(|log| match parse_date(&log.date) {
            Some(date) => date >= cutoff,
            None => {
                tracing::warn!(id = %log.id, date = %log.date, "dropping log with unparseable date");
                false
            }
        })
        .collect();

    if kept.len() < before {
        tracing::debug!(
            pruned = before - kept.len(),
            cutoff = %format_date(cutoff),
            "retention pruned nutrition logs"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::nutrition::types::{MealType, NutritionInfo};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log_on(date: &str) -> NutritionLog {
        NutritionLog::new(
            "r",
            "Toast",
            MealType::Breakfast,
            1.0,
            &NutritionInfo::new(120.0, 4.0, 20.0, 2.0),
            &FixedClock::on(day(2025, 1, 1)),
        )
        .on_date(date)
    }

    #[test]
    fn cutoff_is_inclusive() {
        let today = day(2025, 6, 30);
        assert_eq!(retention_cutoff(today, 365), day(2024, 6, 30));

        let kept = apply_retention(
            vec![log_on("2024-06-29"), log_on("2024-06-30"), log_on("2025-06-30")],
            today,
            365,
        );
        let dates: Vec<&str> = kept.iter().map(|l| l.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-30", "2025-06-30"]);
    }

    #[test]
    fn out_of_range_window_keeps_everything() {
        let today = day(2025, 6, 30);
        assert_eq!(retention_cutoff(today, i64::MAX), NaiveDate::MIN);
        assert_eq!(retention_cutoff(today, 500_000_000), NaiveDate::MIN);
        assert_eq!(retention_cutoff(today, -10), today);

        let kept = apply_retention(vec![log_on("1900-01-01")], today, i64::MAX);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let kept = apply_retention(vec![log_on("someday")], day(2025, 6, 30), 365);
        assert!(kept.is_empty());
    }

    #[test]
    fn reapplying_is_stable() {
        let today = day(2025, 6, 30);
        let once = apply_retention(vec![log_on("2023-01-01"), log_on("2025-06-01")], today, 365);
        let twice = apply_retention(once.clone(), today, 365);
        assert_eq!(once, twice);
    }
}
