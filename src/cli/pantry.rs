//! CLI `pantry` commands: inventory items and usage history.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use larder::clock::{format_date, SystemClock};
use larder::config::LarderConfig;
use larder::inventory::{Category, InventoryItem, InventoryStore, UsageReason};
use larder::kv::KvStore;

use super::{ensure_amount, open_medium};

pub fn add(
    config: &LarderConfig,
    name: &str,
    quantity: f64,
    unit: &str,
    category: Category,
    expires: Option<NaiveDate>,
) -> Result<()> {
    ensure_amount("quantity", quantity)?;

    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = InventoryStore::new(KvStore::new(&medium), &clock);

    let item = InventoryItem::new(name, quantity, unit, category, expires.map(format_date), &clock);
    store.add(&item).context("item was not added")?;
    println!("Added {} {} {} as {}", item.quantity, item.unit, item.name, item.id);
    Ok(())
}

pub fn list(config: &LarderConfig, category: Option<Category>) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = InventoryStore::new(KvStore::new(&medium), &clock);

    let items = match category {
        Some(category) => store.list_by_category(category),
        None => store.list(),
    };
    print_items(&items);
    Ok(())
}

pub fn use_item(config: &LarderConfig, id: &str, quantity: f64, recipe: bool) -> Result<()> {
    ensure_amount("quantity", quantity)?;
    anyhow::ensure!(quantity > 0.0, "quantity must be positive");

    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = InventoryStore::new(KvStore::new(&medium), &clock);

    let reason = if recipe {
        UsageReason::Recipe
    } else {
        UsageReason::Manual
    };
    match store.consume(id, quantity, reason).context("usage was not recorded")? {
        Some(record) => println!("Used {} of {} ({})", record.quantity, record.item_name, record.reason),
        None => println!("No item with id {id}."),
    }
    Ok(())
}

pub fn remove(config: &LarderConfig, id: &str) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    InventoryStore::new(KvStore::new(&medium), &clock)
        .remove(id)
        .context("failed to remove item")?;
    println!("Removed {id} (if it existed).");
    Ok(())
}

pub fn expiring(config: &LarderConfig, days: i64) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let items = InventoryStore::new(KvStore::new(&medium), &clock).expiring_within(days);

    if items.is_empty() {
        println!("Nothing expires in the next {days} day(s).");
        return Ok(());
    }
    print_items(&items);
    Ok(())
}

pub fn history(config: &LarderConfig, item: Option<&str>) -> Result<()> {
    let medium = open_medium(config)?;
    let clock = SystemClock;
    let store = InventoryStore::new(KvStore::new(&medium), &clock);

    let records = match item {
        Some(name) => store.usage_for(name),
        None => store.usage_history(),
    };
    if records.is_empty() {
        println!("No usage recorded.");
        return Ok(());
    }

    println!("{:<26} {:<20} {:>9}  {}", "When", "Item", "Quantity", "Reason");
    println!("{}", "-".repeat(70));
    for record in &records {
        println!(
            "{:<26} {:<20} {:>9.2}  {}",
            record.date.format("%Y-%m-%d %H:%M:%S"),
            record.item_name,
            record.quantity,
            record.reason
        );
    }
    Ok(())
}

fn print_items(items: &[InventoryItem]) {
    if items.is_empty() {
        println!("Inventory is empty.");
        return;
    }

    println!(
        "{:<38} {:<20} {:>9} {:<8} {:<10} {}",
        "ID", "Name", "Quantity", "Unit", "Category", "Expires"
    );
    println!("{}", "-".repeat(100));
    for item in items {
        println!(
            "{:<38} {:<20} {:>9.2} {:<8} {:<10} {}",
            item.id,
            item.name,
            item.quantity,
            item.unit,
            item.category,
            item.expiry_date.as_deref().unwrap_or("-")
        );
    }
}
