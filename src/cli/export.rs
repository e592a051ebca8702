use anyhow::Result;
use serde::Serialize;

use larder::cache::{DishCache, WorldwideDishesCache};
use larder::clock::SystemClock;
use larder::config::LarderConfig;
use larder::inventory::{InventoryItem, InventoryStore, UsageRecord};
use larder::kv::{KvMedium, KvStore};
use larder::nutrition::{DietPlan, DietPlanStore, NutritionLog, NutritionLogStore};

/// Export format: every collection, decoded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    nutrition_logs: Vec<NutritionLog>,
    diet_plan: Option<DietPlan>,
    inventory_items: Vec<InventoryItem>,
    usage_history: Vec<UsageRecord>,
    dish_cache: Vec<WorldwideDishesCache>,
}

/// Export all stored collections as JSON to stdout.
pub fn export(config: &LarderConfig) -> Result<()> {
    let medium = super::open_medium(config)?;
    let clock = SystemClock;
    let kv = KvStore::new(&medium);

    let inventory = InventoryStore::new(kv, &clock);
    let dish_cache = DishCache::new(kv, &clock, config.cache.ttl_days)
        .entries()
        .into_iter()
        .filter_map(|info| kv.read::<WorldwideDishesCache>(&info.key))
        .collect();

    let data = ExportData {
        nutrition_logs: NutritionLogStore::new(kv, &clock, config.nutrition.retention_days)
            .list_all(),
        diet_plan: DietPlanStore::new(kv).get(),
        inventory_items: inventory.list(),
        usage_history: inventory.usage_history(),
        dish_cache,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} meals, {} inventory items, {} usage records, {} cache entries ({} keys total).",
        data.nutrition_logs.len(),
        data.inventory_items.len(),
        data.usage_history.len(),
        data.dish_cache.len(),
        medium.keys_with_prefix("")?.len(),
    );

    Ok(())
}
