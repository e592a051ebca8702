#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use larder::clock::{format_date, FixedClock};
use larder::kv::SqliteMedium;
use larder::nutrition::{MealType, NutritionInfo, NutritionLog};

/// A fresh, fully migrated in-memory SQLite medium.
pub fn test_medium() -> SqliteMedium {
    SqliteMedium::new(larder::db::open_memory_database().unwrap())
}

/// The fixed "today" used across integration tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn test_clock() -> FixedClock {
    FixedClock::on(today())
}

/// `YYYY-MM-DD` for `days_ago` days before [`today`].
pub fn days_ago(days_ago: i64) -> String {
    format_date(today() - Duration::days(days_ago))
}

/// A single-serving log filed `days_ago` days before [`today`].
pub fn meal(days_ago_n: i64, meal_type: MealType, calories: f64) -> NutritionLog {
    let info = NutritionInfo {
        fiber: Some(4.0),
        ..NutritionInfo::new(calories, 25.0, 50.0, 15.0)
    };
    NutritionLog::new("recipe-42", "Test dish", meal_type, 1.0, &info, &test_clock())
        .on_date(days_ago(days_ago_n))
}
