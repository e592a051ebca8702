//! Local persistent data and analytics for a personal cooking assistant.
//!
//! Larder stores the user's own records (nutrition logs, the diet plan, kitchen
//! inventory, and cached reference content) in a single-user key-value store and
//! derives views from them on demand:
//!
//! | Collection | Key | Shape |
//! |------------|-----|-------|
//! | Nutrition logs | `nutrition_logs` | array, pruned to 365 days on every append |
//! | Diet plan | `diet_plan` | single object |
//! | Inventory | `inventory_items` | array keyed by item id |
//! | Usage history | `inventory_usage_history` | append-only array |
//! | Dish cache | `worldwide_dishes:{CC}:{month}:{year}` | one object per key, 7-day TTL |
//!
//! # Architecture
//!
//! - **Medium**: any [`kv::KvMedium`]. [`kv::SqliteMedium`] persists to a single
//!   SQLite table; [`kv::MemoryMedium`] keeps everything in process.
//! - **Adapter**: [`kv::KvStore`] encodes values as versioned JSON and turns read
//!   failures and corrupt values into "absent".
//! - **Collections**: typed stores borrowing the adapter and a [`clock::Clock`].
//! - **Views**: [`nutrition::NutritionEngine`] computes daily totals, the weekly
//!   window, and goal progress.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`kv`]: Key-value medium trait, media, and the typed JSON adapter
//! - [`nutrition`]: Nutrition logs, retention, diet plan, and aggregation
//! - [`inventory`]: Inventory items and the usage ledger
//! - [`cache`]: Worldwide dish cache

pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod inventory;
pub mod kv;
pub mod nutrition;
