//! CLI `plan` commands: set, show, and clear the diet plan.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use larder::clock::{format_date, Clock, SystemClock};
use larder::config::LarderConfig;
use larder::kv::KvStore;
use larder::nutrition::{macros_from_calories, DietPlan, DietPlanStore, DietType, Macros};

use super::{ensure_amount, open_medium};

/// Explicit targets from the command line; any `None` falls back to the preset.
pub struct PlanTargets {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

/// Combine a diet type's preset with explicit overrides.
///
/// Macros not given explicitly are derived from the plan's calories using the
/// preset's split, so a calorie override rescales them.
pub fn build_plan(diet_type: DietType, targets: &PlanTargets, start_date: String) -> Result<DietPlan> {
    for (flag, value) in [
        ("calories", targets.calories),
        ("protein", targets.protein),
        ("carbs", targets.carbs),
        ("fat", targets.fat),
    ] {
        if let Some(value) = value {
            ensure_amount(flag, value)?;
        }
    }

    let plan = match diet_type.preset() {
        Some(preset) => {
            let daily_calories = targets.calories.unwrap_or(preset.daily_calories);
            let derived = macros_from_calories(daily_calories, preset.split);
            DietPlan {
                daily_calories,
                macros: Macros {
                    protein: targets.protein.unwrap_or(derived.protein),
                    carbs: targets.carbs.unwrap_or(derived.carbs),
                    fat: targets.fat.unwrap_or(derived.fat),
                },
                diet_type,
                start_date,
                is_active: true,
            }
        }
        None => {
            let (Some(calories), Some(protein), Some(carbs), Some(fat)) =
                (targets.calories, targets.protein, targets.carbs, targets.fat)
            else {
                bail!("custom plans need --calories, --protein, --carbs and --fat");
            };
            DietPlan {
                daily_calories: calories,
                macros: Macros {
                    protein,
                    carbs,
                    fat,
                },
                diet_type,
                start_date,
                is_active: true,
            }
        }
    };
    Ok(plan)
}

pub fn set(
    config: &LarderConfig,
    diet_type: DietType,
    targets: PlanTargets,
    start: Option<NaiveDate>,
) -> Result<()> {
    let start_date = format_date(start.unwrap_or_else(|| SystemClock.today()));
    let plan = build_plan(diet_type, &targets, start_date)?;

    let medium = open_medium(config)?;
    DietPlanStore::new(KvStore::new(&medium))
        .save(&plan)
        .context("diet plan was not saved")?;

    print_plan(&plan);
    Ok(())
}

pub fn show(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    match DietPlanStore::new(KvStore::new(&medium)).get() {
        Some(plan) => print_plan(&plan),
        None => println!("No diet plan stored."),
    }
    Ok(())
}

pub fn clear(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    DietPlanStore::new(KvStore::new(&medium))
        .delete()
        .context("diet plan was not cleared")?;
    println!("Diet plan cleared.");
    Ok(())
}

fn print_plan(plan: &DietPlan) {
    println!("Diet plan ({})", plan.diet_type);
    println!("{}", "=".repeat(40));
    println!("  Daily calories:  {:.0}", plan.daily_calories);
    println!("  Protein:         {:.0} g", plan.macros.protein);
    println!("  Carbs:           {:.0} g", plan.macros.carbs);
    println!("  Fat:             {:.0} g", plan.macros.fat);
    println!("  From macros:     {:.0} kcal", plan.macro_calories());
    println!("  Start date:      {}", plan.start_date);
    println!("  Active:          {}", if plan.is_active { "yes" } else { "no" });
}
