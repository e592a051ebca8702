//! Nutrition logging, diet plan, and the derived daily/weekly views.

pub mod aggregate;
pub mod log_store;
pub mod plan;
pub mod retention;
pub mod types;

pub use aggregate::{progress, NutritionEngine};
pub use log_store::NutritionLogStore;
pub use plan::{calories_from_macros, macros_from_calories, DietPlanStore};
pub use types::{
    DailyNutrition, DietPlan, DietType, Macros, MealType, NutritionInfo, NutritionLog,
    NutritionProgress, WeeklySummary,
};
