//! Inventory item and usage record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Dairy,
    Proteins,
    Pantry,
    Spices,
    Beverages,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Produce,
        Self::Dairy,
        Self::Proteins,
        Self::Pantry,
        Self::Spices,
        Self::Beverages,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "Produce",
            Self::Dairy => "Dairy",
            Self::Proteins => "Proteins",
            Self::Pantry => "Pantry",
            Self::Spices => "Spices",
            Self::Beverages => "Beverages",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: Category,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        category: Category,
        expiry_date: Option<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.into(),
            quantity,
            unit: unit.into(),
            category,
            expiry_date,
            added_at: clock.now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageReason {
    Manual,
    Recipe,
}

impl std::fmt::Display for UsageReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Manual => "manual",
            Self::Recipe => "recipe",
        })
    }
}

/// One consumption event. Joined to inventory items by name; `item_id` is filled
/// in when the event came from a known item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    pub reason: UsageReason,
}
