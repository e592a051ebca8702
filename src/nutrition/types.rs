//! Nutrition record types.
//!
//! Stored records ([`NutritionLog`], [`DietPlan`]) serialize with camelCase field
//! names. Derived views ([`DailyNutrition`], [`WeeklySummary`],
//! [`NutritionProgress`]) are recomputed on demand and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Add;

use crate::clock::{today_date, Clock};

/// Nutrient amounts. Calories in kcal, the rest in grams except sodium and
/// cholesterol (milligrams).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
}

impl NutritionInfo {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            ..Self::default()
        }
    }

    /// Every present field multiplied by `servings`.
    pub fn scaled(&self, servings: f64) -> Self {
        let scale = |v: Option<f64>| v.map(|x| x * servings);
        Self {
            calories: self.calories * servings,
            protein: self.protein * servings,
            carbs: self.carbs * servings,
            fat: self.fat * servings,
            fiber: scale(self.fiber),
            sodium: scale(self.sodium),
            sugar: scale(self.sugar),
            saturated_fat: scale(self.saturated_fat),
            cholesterol: scale(self.cholesterol),
        }
    }
}

fn add_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

impl Add for NutritionInfo {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: add_optional(self.fiber, rhs.fiber),
            sodium: add_optional(self.sodium, rhs.sodium),
            sugar: add_optional(self.sugar, rhs.sugar),
            saturated_fat: add_optional(self.saturated_fat, rhs.saturated_fat),
            cholesterol: add_optional(self.cholesterol, rhs.cholesterol),
        }
    }
}

impl std::iter::Sum for NutritionInfo {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Brunch,
    Lunch,
    Snack,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        Self::Breakfast,
        Self::Brunch,
        Self::Lunch,
        Self::Snack,
        Self::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Brunch => "Brunch",
            Self::Lunch => "Lunch",
            Self::Snack => "Snack",
            Self::Dinner => "Dinner",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown meal type: {s}"))
    }
}

/// One logged meal. Immutable once created; removed only by id or by retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionLog {
    pub id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub recipe_id: String,
    pub recipe_title: String,
    pub meal_type: MealType,
    pub servings: f64,
    /// Nutrition for the servings actually eaten.
    pub nutrition: NutritionInfo,
    pub timestamp: DateTime<Utc>,
}

impl NutritionLog {
    /// Build a log for today from per-serving nutrition.
    pub fn new(
        recipe_id: impl Into<String>,
        recipe_title: impl Into<String>,
        meal_type: MealType,
        servings: f64,
        per_serving: &NutritionInfo,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            date: today_date(clock),
            recipe_id: recipe_id.into(),
            recipe_title: recipe_title.into(),
            meal_type,
            servings,
            nutrition: per_serving.scaled(servings),
            timestamp: clock.now(),
        }
    }

    /// Same log, filed under another calendar day.
    pub fn on_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    WeightLoss,
    Maintenance,
    MuscleGain,
    Custom,
}

impl DietType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight-loss",
            Self::Maintenance => "maintenance",
            Self::MuscleGain => "muscle-gain",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for DietType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for DietType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight-loss" => Ok(Self::WeightLoss),
            "maintenance" => Ok(Self::Maintenance),
            "muscle-gain" => Ok(Self::MuscleGain),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown diet type: {s}")),
        }
    }
}

/// Daily macro targets in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// The user's calorie and macro goals. At most one is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub daily_calories: f64,
    pub macros: Macros,
    pub diet_type: DietType,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub is_active: bool,
}

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNutrition {
    pub date: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub total_fiber: f64,
    pub meals: Vec<NutritionLog>,
}

impl DailyNutrition {
    /// Zero totals, no meals.
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            total_fiber: 0.0,
            meals: Vec::new(),
        }
    }

    pub fn has_meals(&self) -> bool {
        !self.meals.is_empty()
    }

    /// The day's totals as a [`NutritionInfo`], for goal progress.
    pub fn consumed(&self) -> NutritionInfo {
        NutritionInfo {
            fiber: Some(self.total_fiber),
            ..NutritionInfo::new(
                self.total_calories,
                self.total_protein,
                self.total_carbs,
                self.total_fat,
            )
        }
    }
}

/// One value per tracked goal metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GoalMetrics {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionProgress {
    /// Consumed as a percentage of goal; 0 where the goal is 0.
    pub percentages: GoalMetrics,
    /// Goal minus consumed, floored at 0.
    pub remaining: GoalMetrics,
    pub is_over_goal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Oldest first, ending today.
    pub days: Vec<DailyNutrition>,
    pub average_calories: f64,
    pub average_protein: f64,
    pub average_carbs: f64,
    pub average_fat: f64,
    /// Days with at least one meal.
    pub days_with_data: usize,
    /// Days with `0 < calories <= daily goal`.
    pub days_met_goal: usize,
    pub total_meals: usize,
}
