//! CLI `cache` commands: list and purge worldwide dish cache entries.

use anyhow::Result;

use larder::cache::DishCache;
use larder::clock::SystemClock;
use larder::config::LarderConfig;
use larder::kv::KvStore;

use super::open_medium;

pub fn list(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let entries = DishCache::new(KvStore::new(&medium), &clock, config.cache.ttl_days).entries();

    if entries.is_empty() {
        println!("Dish cache is empty.");
        return Ok(());
    }

    println!("{:<36} {:>6} {:<26} {}", "Key", "Dishes", "Fetched", "Status");
    println!("{}", "-".repeat(80));
    for entry in &entries {
        println!(
            "{:<36} {:>6} {:<26} {}",
            entry.key,
            entry.dish_count,
            entry.fetched_at.format("%Y-%m-%d %H:%M:%S"),
            if entry.valid { "fresh" } else { "expired" }
        );
    }
    Ok(())
}

pub fn purge(config: &LarderConfig) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let removed = DishCache::new(KvStore::new(&medium), &clock, config.cache.ttl_days).purge_expired();
    println!("Removed {removed} expired cache entr{}.", if removed == 1 { "y" } else { "ies" });
    Ok(())
}
