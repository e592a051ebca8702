//! Aggregation engine: per-day totals, weekly window, and goal progress.
//!
//! Everything here is recomputed from the stored logs on each call. Progress is
//! always measured against the plan stored now, not the plan in force when a
//! meal was logged.

use chrono::{Duration, NaiveDate};

use super::log_store::NutritionLogStore;
use super::plan::DietPlanStore;
use super::types::{
    DailyNutrition, DietPlan, GoalMetrics, NutritionInfo, NutritionLog, NutritionProgress,
    WeeklySummary,
};
use crate::clock::{format_date, Clock};

/// Sum a set of logs into one day's totals. Missing fiber counts as 0.
pub fn totals_for(date: &str, meals: Vec<NutritionLog>) -> DailyNutrition {
    let mut day = DailyNutrition::empty(date);
    for log in &meals {
        day.total_calories += log.nutrition.calories;
        day.total_protein += log.nutrition.protein;
        day.total_carbs += log.nutrition.carbs;
        day.total_fat += log.nutrition.fat;
        day.total_fiber += log.nutrition.fiber.unwrap_or(0.0);
    }
    day.meals = meals;
    day
}

fn percentage(consumed: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        consumed / goal * 100.0
    } else {
        0.0
    }
}

fn remaining(consumed: f64, goal: f64) -> f64 {
    (goal - consumed).max(0.0)
}

/// Progress of `consumed` against `goals`.
pub fn progress(consumed: &NutritionInfo, goals: &DietPlan) -> NutritionProgress {
    NutritionProgress {
        percentages: GoalMetrics {
            calories: percentage(consumed.calories, goals.daily_calories),
            protein: percentage(consumed.protein, goals.macros.protein),
            carbs: percentage(consumed.carbs, goals.macros.carbs),
            fat: percentage(consumed.fat, goals.macros.fat),
        },
        remaining: GoalMetrics {
            calories: remaining(consumed.calories, goals.daily_calories),
            protein: remaining(consumed.protein, goals.macros.protein),
            carbs: remaining(consumed.carbs, goals.macros.carbs),
            fat: remaining(consumed.fat, goals.macros.fat),
        },
        is_over_goal: consumed.calories > goals.daily_calories,
    }
}

/// Reduce a window of days into averages and goal counts.
///
/// Averages divide by the number of days with at least one meal (minimum 1).
/// A day only meets the goal when something was eaten and the calorie total is
/// within the plan's daily calories; without a plan no day meets it.
pub fn summarize(days: Vec<DailyNutrition>, plan: Option<&DietPlan>) -> WeeklySummary {
    let days_with_data = days.iter().filter(|d| d.has_meals()).count();
    let divisor = days_with_data.max(1) as f64;

    let days_met_goal = plan.map_or(0, |plan| {
        days.iter()
            .filter(|d| d.total_calories > 0.0 && d.total_calories <= plan.daily_calories)
            .count()
    });

    let sum = |f: fn(&DailyNutrition) -> f64| days.iter().map(f).sum::<f64>();

    WeeklySummary {
        average_calories: sum(|d| d.total_calories) / divisor,
        average_protein: sum(|d| d.total_protein) / divisor,
        average_carbs: sum(|d| d.total_carbs) / divisor,
        average_fat: sum(|d| d.total_fat) / divisor,
        days_with_data,
        days_met_goal,
        total_meals: days.iter().map(|d| d.meals.len()).sum(),
        days,
    }
}

/// Longest window [`NutritionEngine::weekly_logs`] will build.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Read-side views over the log store and the diet plan.
pub struct NutritionEngine<'a> {
    logs: NutritionLogStore<'a>,
    plans: DietPlanStore<'a>,
    clock: &'a dyn Clock,
    window_days: u32,
}

impl<'a> NutritionEngine<'a> {
    pub fn new(
        logs: NutritionLogStore<'a>,
        plans: DietPlanStore<'a>,
        clock: &'a dyn Clock,
        window_days: u32,
    ) -> Self {
        Self {
            logs,
            plans,
            clock,
            window_days: window_days.clamp(1, MAX_WINDOW_DAYS),
        }
    }

    /// Totals for `date`; zero totals and no meals when nothing was logged.
    pub fn daily_totals(&self, date: &str) -> DailyNutrition {
        totals_for(date, self.logs.list_by_date(date))
    }

    /// One entry per calendar day in `start..=end`, zero-filled, oldest first.
    pub fn daily_totals_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<DailyNutrition> {
        let logs = self
            .logs
            .list_by_range(&format_date(start), &format_date(end));

        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| {
                let date = format_date(day);
                let meals = logs.iter().filter(|l| l.date == date).cloned().collect();
                totals_for(&date, meals)
            })
            .collect()
    }

    /// The window of days ending today (7 by default), oldest first.
    pub fn weekly_logs(&self) -> Vec<DailyNutrition> {
        let today = self.clock.today();
        let start = Duration::try_days(i64::from(self.window_days) - 1)
            .and_then(|span| today.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        self.daily_totals_between(start, today)
    }

    pub fn weekly_summary(&self) -> WeeklySummary {
        summarize(self.weekly_logs(), self.plans.active().as_ref())
    }

    /// Today's progress against the active plan, if there is one.
    pub fn today_progress(&self) -> Option<NutritionProgress> {
        let plan = self.plans.active()?;
        let today = self.daily_totals(&format_date(self.clock.today()));
        Some(progress(&today.consumed(), &plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::kv::{KvStore, MemoryMedium};
    use crate::nutrition::types::{DietType, Macros, MealType};

    fn plan(daily_calories: f64, protein: f64) -> DietPlan {
        DietPlan {
            daily_calories,
            macros: Macros {
                protein,
                carbs: 250.0,
                fat: 70.0,
            },
            diet_type: DietType::Custom,
            start_date: "2025-01-01".into(),
            is_active: true,
        }
    }

    fn meal(date: &str, calories: f64, fiber: Option<f64>) -> NutritionLog {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let info = NutritionInfo {
            fiber,
            ..NutritionInfo::new(calories, 20.0, 30.0, 10.0)
        };
        NutritionLog::new("r", "Bowl", MealType::Dinner, 1.0, &info, &clock).on_date(date)
    }

    #[test]
    fn totals_sum_and_default_fiber() {
        let day = totals_for(
            "2025-01-01",
            vec![meal("2025-01-01", 400.0, Some(5.0)), meal("2025-01-01", 300.0, None)],
        );
        assert_eq!(day.total_calories, 700.0);
        assert_eq!(day.total_protein, 40.0);
        assert_eq!(day.total_fiber, 5.0);
        assert_eq!(day.meals.len(), 2);
    }

    #[test]
    fn progress_guards_zero_goal() {
        let consumed = NutritionInfo::new(500.0, 10.0, 10.0, 10.0);
        let result = progress(&consumed, &plan(0.0, 100.0));
        assert_eq!(result.percentages.calories, 0.0);
        assert_eq!(result.remaining.calories, 0.0);
        assert!(result.is_over_goal);
    }

    #[test]
    fn progress_remaining_never_negative() {
        let consumed = NutritionInfo::new(1000.0, 180.0, 125.0, 35.0);
        let result = progress(&consumed, &plan(2000.0, 150.0));
        assert_eq!(result.remaining.protein, 0.0);
        assert_eq!(result.percentages.protein, 120.0);
        assert_eq!(result.percentages.calories, 50.0);
        assert_eq!(result.percentages.carbs, 50.0);
        assert_eq!(result.remaining.calories, 1000.0);
        assert!(!result.is_over_goal);
    }

    #[test]
    fn summarize_skips_empty_days_for_goal_and_average() {
        let days = vec![
            DailyNutrition::empty("2025-01-01"),
            totals_for("2025-01-02", vec![meal("2025-01-02", 1800.0, None)]),
            totals_for("2025-01-03", vec![meal("2025-01-03", 2400.0, None)]),
        ];
        let summary = summarize(days, Some(&plan(2000.0, 100.0)));
        assert_eq!(summary.days_with_data, 2);
        assert_eq!(summary.days_met_goal, 1);
        assert_eq!(summary.average_calories, 2100.0);
        assert_eq!(summary.total_meals, 2);
    }

    #[test]
    fn summarize_without_plan_meets_no_goal() {
        let days = vec![
            totals_for("2025-01-02", vec![meal("2025-01-02", 1800.0, None)]),
            totals_for("2025-01-03", vec![meal("2025-01-03", 1200.0, None)]),
        ];
        let summary = summarize(days, None);
        assert_eq!(summary.days_with_data, 2);
        assert_eq!(summary.days_met_goal, 0);
        assert_eq!(summary.average_calories, 1500.0);
    }

    #[test]
    fn window_length_is_clamped() {
        let medium = MemoryMedium::new();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        let kv = KvStore::new(&medium);
        let logs = NutritionLogStore::new(kv, &clock, 365);

        let wide = NutritionEngine::new(logs, DietPlanStore::new(kv), &clock, u32::MAX);
        assert_eq!(wide.weekly_logs().len(), MAX_WINDOW_DAYS as usize);

        let narrow = NutritionEngine::new(logs, DietPlanStore::new(kv), &clock, 0);
        let week = narrow.weekly_logs();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].date, "2025-03-02");
    }

    #[test]
    fn summarize_with_no_data_does_not_divide_by_zero() {
        let days = vec![DailyNutrition::empty("2025-01-01"); 7];
        let summary = summarize(days, Some(&plan(2000.0, 100.0)));
        assert_eq!(summary.average_calories, 0.0);
        assert_eq!(summary.days_met_goal, 0);
    }

    #[test]
    fn weekly_logs_window() {
        let medium = MemoryMedium::new();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        let kv = KvStore::new(&medium);
        let logs = NutritionLogStore::new(kv, &clock, 365);
        logs.append(&meal("2025-02-24", 999.0, None)).unwrap();
        logs.append(&meal("2025-02-25", 500.0, None)).unwrap();
        logs.append(&meal("2025-03-02", 700.0, None)).unwrap();

        let engine = NutritionEngine::new(logs, DietPlanStore::new(kv), &clock, 7);
        let week = engine.weekly_logs();
        let dates: Vec<&str> = week.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2025-02-24", "2025-02-25", "2025-02-26", "2025-02-27", "2025-02-28",
                "2025-03-01", "2025-03-02"
            ]
        );
        assert_eq!(week[0].total_calories, 999.0);
        assert_eq!(week[1].total_calories, 500.0);
        assert!(!week[2].has_meals());
        assert_eq!(week[6].total_calories, 700.0);
    }

    #[test]
    fn today_progress_needs_active_plan() {
        let medium = MemoryMedium::new();
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        let kv = KvStore::new(&medium);
        let logs = NutritionLogStore::new(kv, &clock, 365);
        let plans = DietPlanStore::new(kv);
        logs.append(&meal("2025-03-02", 1000.0, None)).unwrap();

        let engine = NutritionEngine::new(logs, plans, &clock, 7);
        assert!(engine.today_progress().is_none());

        plans.save(&plan(2000.0, 100.0)).unwrap();
        let progress = engine.today_progress().unwrap();
        assert_eq!(progress.percentages.calories, 50.0);
        assert_eq!(progress.remaining.protein, 80.0);
    }
}
