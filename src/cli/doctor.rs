//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use larder::config::LarderConfig;
use larder::db;
use larder::inventory::store::{INVENTORY_ITEMS_KEY, USAGE_HISTORY_KEY};
use larder::nutrition::log_store::NUTRITION_LOGS_KEY;
use larder::nutrition::plan::DIET_PLAN_KEY;
use larder::inventory::{InventoryItem, UsageRecord};
use larder::kv::{KvStore, SqliteMedium};
use larder::nutrition::{DietPlan, NutritionLog};

/// Keys every installation may hold, checked for decodability.
const COLLECTION_KEYS: [&str; 4] = [
    NUTRITION_LOGS_KEY,
    DIET_PLAN_KEY,
    INVENTORY_ITEMS_KEY,
    USAGE_HISTORY_KEY,
];

/// Run database diagnostics and print a health report.
pub fn doctor(config: &LarderConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("It is created on first write, e.g. `larder log add ...`.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Larder Health Report");
    println!("====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!(
        "Record envelope:   {}",
        report
            .envelope_version
            .map_or("(not set)".to_string(), |v| format!("v{v}"))
    );
    println!();
    println!("Stored keys:       {}", report.entry_count);
    println!("Stored data:       {}", format_bytes(report.value_bytes));
    println!(
        "Per-key quota:     {}",
        format_bytes(config.storage.max_value_bytes)
    );
    println!();

    let medium = SqliteMedium::new(conn);
    let kv = KvStore::new(&medium);
    println!("Collections:");
    for key in COLLECTION_KEYS {
        let status = match medium.conn().query_row(
            "SELECT LENGTH(CAST(value AS BLOB)) FROM kv_entries WHERE key = ?1",
            [key],
            |row| row.get::<_, i64>(0),
        ) {
            Err(rusqlite::Error::QueryReturnedNoRows) => "absent".to_string(),
            Err(e) => format!("unreadable ({e})"),
            Ok(size) if collection_decodes(kv, key) => format!("ok, {}", format_bytes(size as u64)),
            Ok(_) => "CORRUPT (will read as empty)".to_string(),
        };
        println!("  {key:<26} {status}");
    }
    println!();

    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Export what is still readable: larder export > backup.json");
        println!("  2. Move the damaged database aside and start fresh.");
    }

    Ok(())
}

/// Whether the value under `key` decodes into the type its store reads it as.
fn collection_decodes(kv: KvStore<'_>, key: &str) -> bool {
    match key {
        NUTRITION_LOGS_KEY => kv.read::<Vec<NutritionLog>>(key).is_some(),
        DIET_PLAN_KEY => kv.read::<DietPlan>(key).is_some(),
        INVENTORY_ITEMS_KEY => kv.read::<Vec<InventoryItem>>(key).is_some(),
        USAGE_HISTORY_KEY => kv.read::<Vec<UsageRecord>>(key).is_some(),
        _ => kv.read::<serde_json::Value>(key).is_some(),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder::kv::{KvMedium, MemoryMedium};

    #[test]
    fn well_formed_json_of_the_wrong_shape_is_corrupt() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);

        medium.set(NUTRITION_LOGS_KEY, r#"{"version":1,"data":[{"id":7}]}"#).unwrap();
        medium.set(DIET_PLAN_KEY, r#"{"version":1,"data":{"dailyCalories":"lots"}}"#).unwrap();
        medium.set(INVENTORY_ITEMS_KEY, "[]").unwrap();
        medium.set(USAGE_HISTORY_KEY, r#"[{"itemName":"Basil"}]"#).unwrap();

        assert!(!collection_decodes(kv, NUTRITION_LOGS_KEY));
        assert!(!collection_decodes(kv, DIET_PLAN_KEY));
        assert!(collection_decodes(kv, INVENTORY_ITEMS_KEY));
        assert!(!collection_decodes(kv, USAGE_HISTORY_KEY));
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
    }
}
