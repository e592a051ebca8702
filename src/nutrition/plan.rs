//! Diet Plan singleton and calorie/macro conversion helpers.

use serde::Serialize;

use super::types::{DietPlan, DietType, Macros};
use crate::kv::{KvError, KvStore};

pub const DIET_PLAN_KEY: &str = "diet_plan";

pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
pub const CARBS_KCAL_PER_GRAM: f64 = 4.0;
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Calories supplied by the given macro grams.
pub fn calories_from_macros(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * PROTEIN_KCAL_PER_GRAM + carbs * CARBS_KCAL_PER_GRAM + fat * FAT_KCAL_PER_GRAM
}

/// Share of daily calories per macro, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

/// Grams of each macro that deliver `split` of `calories`, rounded to whole grams.
pub fn macros_from_calories(calories: f64, split: MacroSplit) -> Macros {
    let grams = |pct: f64, kcal_per_gram: f64| (calories * pct / 100.0 / kcal_per_gram).round();
    Macros {
        protein: grams(split.protein_pct, PROTEIN_KCAL_PER_GRAM),
        carbs: grams(split.carbs_pct, CARBS_KCAL_PER_GRAM),
        fat: grams(split.fat_pct, FAT_KCAL_PER_GRAM),
    }
}

/// Default parameters for a non-custom diet type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DietPreset {
    pub daily_calories: f64,
    pub split: MacroSplit,
}

impl DietType {
    pub fn preset(&self) -> Option<DietPreset> {
        let (daily_calories, protein_pct, carbs_pct, fat_pct) = match self {
            Self::WeightLoss => (1800.0, 30.0, 40.0, 30.0),
            Self::Maintenance => (2200.0, 25.0, 50.0, 25.0),
            Self::MuscleGain => (2800.0, 30.0, 45.0, 25.0),
            Self::Custom => return None,
        };
        Some(DietPreset {
            daily_calories,
            split: MacroSplit {
                protein_pct,
                carbs_pct,
                fat_pct,
            },
        })
    }
}

impl DietPlan {
    /// An active plan built from a preset. `None` for [`DietType::Custom`].
    pub fn from_preset(diet_type: DietType, start_date: impl Into<String>) -> Option<Self> {
        let preset = diet_type.preset()?;
        Some(Self {
            daily_calories: preset.daily_calories,
            macros: macros_from_calories(preset.daily_calories, preset.split),
            diet_type,
            start_date: start_date.into(),
            is_active: true,
        })
    }

    /// Calories implied by the macro targets. Not required to equal `daily_calories`.
    pub fn macro_calories(&self) -> f64 {
        calories_from_macros(self.macros.protein, self.macros.carbs, self.macros.fat)
    }
}

#[derive(Clone, Copy)]
pub struct DietPlanStore<'a> {
    kv: KvStore<'a>,
}

impl<'a> DietPlanStore<'a> {
    pub fn new(kv: KvStore<'a>) -> Self {
        Self { kv }
    }

    /// Replace the stored plan wholesale.
    pub fn save(&self, plan: &DietPlan) -> Result<(), KvError> {
        self.kv.write(DIET_PLAN_KEY, plan)?;
        tracing::info!(diet_type = %plan.diet_type, daily_calories = plan.daily_calories, "diet plan saved");
        Ok(())
    }

    pub fn get(&self) -> Option<DietPlan> {
        self.kv.read(DIET_PLAN_KEY)
    }

    /// The stored plan, if it is marked active.
    pub fn active(&self) -> Option<DietPlan> {
        self.get().filter(|plan| plan.is_active)
    }

    pub fn delete(&self) -> Result<(), KvError> {
        self.kv.remove(DIET_PLAN_KEY)
    }
}
