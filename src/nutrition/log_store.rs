//! Nutrition Log Store: the `nutrition_logs` collection.

use super::retention::apply_retention;
use super::types::NutritionLog;
use crate::clock::Clock;
use crate::kv::{KvError, KvStore};

pub const NUTRITION_LOGS_KEY: &str = "nutrition_logs";

#[derive(Clone, Copy)]
pub struct NutritionLogStore<'a> {
    kv: KvStore<'a>,
    clock: &'a dyn Clock,
    retention_days: i64,
}

impl<'a> NutritionLogStore<'a> {
    pub fn new(kv: KvStore<'a>, clock: &'a dyn Clock, retention_days: i64) -> Self {
        Self {
            kv,
            clock,
            retention_days,
        }
    }

    /// Append `entry`, prune to the retention window, and write the collection back.
    ///
    /// On error the entry was not logged.
    pub fn append(&self, entry: &NutritionLog) -> Result<(), KvError> {
        let mut logs = self.list_all();
        logs.push(entry.clone());
        let logs = apply_retention(logs, self.clock.today(), self.retention_days);

        self.kv.write(NUTRITION_LOGS_KEY, &logs)?;
        tracing::debug!(id = %entry.id, date = %entry.date, "nutrition log appended");
        Ok(())
    }

    pub fn list_all(&self) -> Vec<NutritionLog> {
        self.kv.read_collection(NUTRITION_LOGS_KEY)
    }

    /// Logs whose date equals `date` exactly.
    pub fn list_by_date(&self, date: &str) -> Vec<NutritionLog> {
        self.list_all()
            .into_iter()
            .filter(|log| log.date == date)
            .collect()
    }

    /// Logs dated within `start..=end`. `YYYY-MM-DD` strings sort chronologically,
    /// so plain string comparison is enough.
    pub fn list_by_range(&self, start: &str, end: &str) -> Vec<NutritionLog> {
        self.list_all()
            .into_iter()
            .filter(|log| log.date.as_str() >= start && log.date.as_str() <= end)
            .collect()
    }

    /// Remove the log with `id`. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> Result<(), KvError> {
        let mut logs = self.list_all();
        let before = logs.len();
        logs.retain(|log| log.id != id);

        if logs.len() == before {
            return Ok(());
        }
        self.kv.write(NUTRITION_LOGS_KEY, &logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::kv::{KvMedium, MemoryMedium};
    use crate::nutrition::types::{MealType, NutritionInfo};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap())
    }

    fn log(clock: &FixedClock, date: &str, calories: f64) -> NutritionLog {
        NutritionLog::new(
            "recipe-1",
            "Lentil soup",
            MealType::Lunch,
            1.0,
            &NutritionInfo::new(calories, 18.0, 40.0, 6.0),
            clock,
        )
        .on_date(date)
    }

    #[test]
    fn append_then_list_round_trips() {
        let medium = MemoryMedium::new();
        let clock = clock();
        let store = NutritionLogStore::new(KvStore::new(&medium), &clock, 365);

        let entry = log(&clock, "2025-03-15", 350.0);
        store.append(&entry).unwrap();

        assert_eq!(store.list_all(), vec![entry]);
    }

    #[test]
    fn list_by_date_and_range() {
        let medium = MemoryMedium::new();
        let clock = clock();
        let store = NutritionLogStore::new(KvStore::new(&medium), &clock, 365);

        for date in ["2025-03-10", "2025-03-12", "2025-03-14", "2025-03-15"] {
            store.append(&log(&clock, date, 100.0)).unwrap();
        }

        assert_eq!(store.list_by_date("2025-03-12").len(), 1);
        assert!(store.list_by_date("2025-03-11").is_empty());

        let range: Vec<String> = store
            .list_by_range("2025-03-12", "2025-03-14")
            .into_iter()
            .map(|l| l.date)
            .collect();
        assert_eq!(range, vec!["2025-03-12", "2025-03-14"]);
    }

    #[test]
    fn remove_is_idempotent() {
        let medium = MemoryMedium::new();
        let clock = clock();
        let store = NutritionLogStore::new(KvStore::new(&medium), &clock, 365);

        let keep = log(&clock, "2025-03-15", 100.0);
        let drop = log(&clock, "2025-03-15", 200.0);
        store.append(&keep).unwrap();
        store.append(&drop).unwrap();

        store.remove(&drop.id).unwrap();
        let once = store.list_all();
        store.remove(&drop.id).unwrap();
        assert_eq!(store.list_all(), once);
        assert_eq!(once, vec![keep]);
    }

    #[test]
    fn failed_append_is_not_logged() {
        let medium = MemoryMedium::new();
        let clock = clock();
        let store = NutritionLogStore::new(KvStore::new(&medium), &clock, 365);
        store.append(&log(&clock, "2025-03-14", 100.0)).unwrap();

        medium.set_unavailable(true);
        assert!(store.append(&log(&clock, "2025-03-15", 100.0)).is_err());
        medium.set_unavailable(false);

        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn corrupt_collection_lists_empty_and_heals_on_append() {
        let medium = MemoryMedium::new();
        medium.set(NUTRITION_LOGS_KEY, "[{\"id\": 7}]").unwrap();
        let clock = clock();
        let store = NutritionLogStore::new(KvStore::new(&medium), &clock, 365);

        assert!(store.list_all().is_empty());
        store.append(&log(&clock, "2025-03-15", 100.0)).unwrap();
        assert_eq!(store.list_all().len(), 1);
    }
}
