//! CLI nutrition commands: `log add|list|remove`, `today`, and `week`.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use larder::clock::{format_date, today_date, SystemClock};
use larder::config::LarderConfig;
use larder::kv::KvStore;
use larder::nutrition::{
    DailyNutrition, DietPlanStore, MealType, NutritionEngine, NutritionInfo, NutritionLog,
    NutritionLogStore,
};

use super::{ensure_amount, open_medium};

pub fn log_add(
    config: &LarderConfig,
    recipe_id: &str,
    title: &str,
    meal: MealType,
    servings: f64,
    per_serving: &NutritionInfo,
    date: Option<NaiveDate>,
) -> Result<()> {
    ensure_amount("servings", servings)?;
    anyhow::ensure!(servings > 0.0, "servings must be positive");
    ensure_amount("calories", per_serving.calories)?;
    ensure_amount("protein", per_serving.protein)?;
    ensure_amount("carbs", per_serving.carbs)?;
    ensure_amount("fat", per_serving.fat)?;
    if let Some(fiber) = per_serving.fiber {
        ensure_amount("fiber", fiber)?;
    }

    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = NutritionLogStore::new(KvStore::new(&medium), &clock, config.nutrition.retention_days);

    let mut entry = NutritionLog::new(recipe_id, title, meal, servings, per_serving, &clock);
    if let Some(date) = date {
        entry = entry.on_date(format_date(date));
    }

    store.append(&entry).context("meal was not logged")?;
    println!(
        "Logged {} ({}, {} kcal) on {} as {}",
        entry.recipe_title, entry.meal_type, entry.nutrition.calories, entry.date, entry.id
    );
    Ok(())
}

pub fn log_list(
    config: &LarderConfig,
    date: Option<NaiveDate>,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = NutritionLogStore::new(KvStore::new(&medium), &clock, config.nutrition.retention_days);

    let logs = match (date, range) {
        (Some(date), _) => store.list_by_date(&format_date(date)),
        (None, Some((from, to))) => store.list_by_range(&format_date(from), &format_date(to)),
        (None, None) => store.list_all(),
    };

    if logs.is_empty() {
        println!("No meals logged.");
        return Ok(());
    }

    println!(
        "{:<38} {:<10} {:<10} {:>8} {:>9}  {}",
        "ID", "Date", "Meal", "Servings", "Calories", "Recipe"
    );
    println!("{}", "-".repeat(100));
    for log in &logs {
        println!(
            "{:<38} {:<10} {:<10} {:>8.2} {:>9.0}  {}",
            log.id, log.date, log.meal_type, log.servings, log.nutrition.calories, log.recipe_title
        );
    }
    Ok(())
}

pub fn log_remove(config: &LarderConfig, id: &str) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = NutritionLogStore::new(KvStore::new(&medium), &clock, config.nutrition.retention_days);

    store.remove(id).context("failed to remove meal")?;
    println!("Removed {id} (if it existed).");
    Ok(())
}

pub fn today(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let engine = engine(config, KvStore::new(&medium), &clock);

    let day = engine.daily_totals(&today_date(&clock));
    print_day(&day);
    println!();

    match engine.today_progress() {
        Some(progress) => {
            println!("Progress:");
            println!(
                "  Calories   {:>6.1}%  ({:.0} kcal left)",
                progress.percentages.calories, progress.remaining.calories
            );
            println!(
                "  Protein    {:>6.1}%  ({:.0} g left)",
                progress.percentages.protein, progress.remaining.protein
            );
            println!(
                "  Carbs      {:>6.1}%  ({:.0} g left)",
                progress.percentages.carbs, progress.remaining.carbs
            );
            println!(
                "  Fat        {:>6.1}%  ({:.0} g left)",
                progress.percentages.fat, progress.remaining.fat
            );
            if progress.is_over_goal {
                println!("  Over today's calorie goal.");
            }
        }
        None => println!("No active diet plan. Set one with `larder plan set`."),
    }
    Ok(())
}

pub fn week(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let engine = engine(config, KvStore::new(&medium), &clock);

    let summary = engine.weekly_summary();

    println!(
        "{:<10} {:>6} {:>9} {:>8} {:>8} {:>8}",
        "Date", "Meals", "Calories", "Protein", "Carbs", "Fat"
    );
    println!("{}", "-".repeat(54));
    for day in &summary.days {
        println!(
            "{:<10} {:>6} {:>9.0} {:>8.1} {:>8.1} {:>8.1}",
            day.date,
            day.meals.len(),
            day.total_calories,
            day.total_protein,
            day.total_carbs,
            day.total_fat
        );
    }
    println!();
    println!("Days logged:          {}", summary.days_with_data);
    println!("Days within goal:     {}", summary.days_met_goal);
    println!("Meals:                {}", summary.total_meals);
    println!("Average calories:     {:.0}", summary.average_calories);
    println!(
        "Average macros (g):   P {:.1} / C {:.1} / F {:.1}",
        summary.average_protein, summary.average_carbs, summary.average_fat
    );
    Ok(())
}

fn engine<'a>(
    config: &LarderConfig,
    kv: KvStore<'a>,
    clock: &'a SystemClock,
) -> NutritionEngine<'a> {
    NutritionEngine::new(
        NutritionLogStore::new(kv, clock, config.nutrition.retention_days),
        DietPlanStore::new(kv),
        clock,
        config.nutrition.week_length_days,
    )
}

fn print_day(day: &DailyNutrition) {
    println!("Nutrition for {}", day.date);
    println!("{}", "=".repeat(40));
    println!("  Calories:   {:.0}", day.total_calories);
    println!("  Protein:    {:.1} g", day.total_protein);
    println!("  Carbs:      {:.1} g", day.total_carbs);
    println!("  Fat:        {:.1} g", day.total_fat);
    println!("  Fiber:      {:.1} g", day.total_fiber);

    if day.has_meals() {
        println!();
        println!("Meals:");
        for meal in &day.meals {
            println!(
                "  {:<10} {} x{} ({:.0} kcal)",
                meal.meal_type,
                meal.recipe_title,
                meal.servings,
                meal.nutrition.calories
            );
        }
    }
}
