//! Kitchen inventory and its usage ledger.

pub mod store;
pub mod types;

pub use store::InventoryStore;
pub use types::{Category, InventoryItem, UsageReason, UsageRecord};
