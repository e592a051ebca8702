//! Inventory items keyed by id, plus the append-only usage ledger.
//!
//! The two collections live under separate keys and are written independently;
//! [`InventoryStore::consume`] updates the item first and then appends the usage
//! record, with no atomicity across the two.

use chrono::{Duration, NaiveDate};

use super::types::{Category, InventoryItem, UsageReason, UsageRecord};
use crate::clock::{parse_date, Clock};
use crate::kv::{KvError, KvStore};

pub const INVENTORY_ITEMS_KEY: &str = "inventory_items";
pub const USAGE_HISTORY_KEY: &str = "inventory_usage_history";

#[derive(Clone, Copy)]
pub struct InventoryStore<'a> {
    kv: KvStore<'a>,
    clock: &'a dyn Clock,
}

impl<'a> InventoryStore<'a> {
    pub fn new(kv: KvStore<'a>, clock: &'a dyn Clock) -> Self {
        Self { kv, clock }
    }

    pub fn list(&self) -> Vec<InventoryItem> {
        self.kv.read_collection(INVENTORY_ITEMS_KEY)
    }

    pub fn get(&self, id: &str) -> Option<InventoryItem> {
        self.list().into_iter().find(|item| item.id == id)
    }

    pub fn list_by_category(&self, category: Category) -> Vec<InventoryItem> {
        self.list()
            .into_iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Add `item`, replacing any existing item with the same id.
    pub fn add(&self, item: &InventoryItem) -> Result<(), KvError> {
        let mut items = self.list();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.kv.write(INVENTORY_ITEMS_KEY, &items)?;
        tracing::debug!(id = %item.id, name = %item.name, "inventory item stored");
        Ok(())
    }

    /// Replace the item with `item.id`. Returns `false` if no such item exists.
    pub fn update(&self, item: &InventoryItem) -> Result<bool, KvError> {
        let mut items = self.list();
        let Some(existing) = items.iter_mut().find(|existing| existing.id == item.id) else {
            return Ok(false);
        };
        *existing = item.clone();
        self.kv.write(INVENTORY_ITEMS_KEY, &items)?;
        Ok(true)
    }

    /// Remove the item with `id`. Unknown ids are a no-op.
    pub fn remove(&self, id: &str) -> Result<(), KvError> {
        let mut items = self.list();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(());
        }
        self.kv.write(INVENTORY_ITEMS_KEY, &items)
    }

    /// Items expiring on or before today + `days`, already expired included,
    /// soonest first. Items without a parseable expiry date are skipped.
    pub fn expiring_within(&self, days: i64) -> Vec<InventoryItem> {
        let horizon = Duration::try_days(days)
            .and_then(|window| self.clock.today().checked_add_signed(window))
            .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
        let mut expiring: Vec<_> = self
            .list()
            .into_iter()
            .filter_map(|item| {
                let expiry = item.expiry_date.as_deref().and_then(parse_date)?;
                (expiry <= horizon).then_some((expiry, item))
            })
            .collect();
        expiring.sort_by_key(|(expiry, _)| *expiry);
        expiring.into_iter().map(|(_, item)| item).collect()
    }

    /// Take `quantity` from the item with `id` and record the usage.
    ///
    /// The item is removed once its quantity reaches zero. Returns `None` when no
    /// item has that id.
    pub fn consume(
        &self,
        id: &str,
        quantity: f64,
        reason: UsageReason,
    ) -> Result<Option<UsageRecord>, KvError> {
        let mut items = self.list();
        let Some(pos) = items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };

        let item = &mut items[pos];
        item.quantity -= quantity;
        let record = UsageRecord {
            item_name: item.name.clone(),
            item_id: Some(item.id.clone()),
            quantity,
            date: self.clock.now(),
            reason,
        };
        if item.quantity <= 0.0 {
            tracing::debug!(id, name = %item.name, "inventory item used up");
            items.remove(pos);
        }

        self.kv.write(INVENTORY_ITEMS_KEY, &items)?;
        self.record_usage(&record)?;
        Ok(Some(record))
    }

    pub fn record_usage(&self, record: &UsageRecord) -> Result<(), KvError> {
        let mut history = self.usage_history();
        history.push(record.clone());
        self.kv.write(USAGE_HISTORY_KEY, &history)
    }

    pub fn usage_history(&self) -> Vec<UsageRecord> {
        self.kv.read_collection(USAGE_HISTORY_KEY)
    }

    /// Usage records whose item name matches `name`, ignoring case.
    pub fn usage_for(&self, name: &str) -> Vec<UsageRecord> {
        let name = name.to_lowercase();
        self.usage_history()
            .into_iter()
            .filter(|record| record.item_name.to_lowercase() == name)
            .collect()
    }
}
