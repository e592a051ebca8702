//! Time-boxed cache for "dishes of the month" per country.
//!
//! Each `(country, month, year)` lives under its own key. Entries are never
//! patched: an expired entry is simply ignored until a fresh fetch overwrites
//! it. Old keys for past months stay behind until [`DishCache::purge_expired`]
//! is run.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::kv::{decode, KvError, KvStore};

pub const DEFAULT_TTL_DAYS: i64 = 7;
pub const CACHE_KEY_PREFIX: &str = "worldwide_dishes:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: String,
    pub title: String,
    pub country: String,
    pub country_code: String,
    pub category: String,
    pub description: String,
    pub difficulty: String,
    pub prep_time: String,
    pub cook_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub country_code: String,
    pub month: u32,
    pub year: i32,
}

impl CacheKey {
    pub fn new(country_code: &str, month: u32, year: i32) -> Self {
        Self {
            country_code: country_code.to_ascii_uppercase(),
            month,
            year,
        }
    }

    pub fn storage_key(&self) -> String {
        format!(
            "{CACHE_KEY_PREFIX}{}:{}:{}",
            self.country_code, self.month, self.year
        )
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:02}/{}", self.country_code, self.month, self.year)
    }
}

/// A stored cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldwideDishesCache {
    pub country_code: String,
    pub month: u32,
    pub year: i32,
    pub dishes: Vec<Dish>,
    /// When the dishes were fetched.
    pub timestamp: DateTime<Utc>,
}

impl WorldwideDishesCache {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(&self.country_code, self.month, self.year)
    }
}

/// `true` while the entry is younger than `ttl`.
pub fn is_valid(entry: &WorldwideDishesCache, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - entry.timestamp < ttl
}

/// The external content source consulted on a cache miss.
pub trait DishSource {
    fn fetch_dishes(&self, country_code: &str, month: u32, year: i32) -> anyhow::Result<Vec<Dish>>;
}

/// Summary row for [`DishCache::entries`].
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub dish_count: usize,
    pub fetched_at: DateTime<Utc>,
    pub valid: bool,
}

#[derive(Clone, Copy)]
pub struct DishCache<'a> {
    kv: KvStore<'a>,
    clock: &'a dyn Clock,
    ttl: Duration,
}

impl<'a> DishCache<'a> {
    pub fn new(kv: KvStore<'a>, clock: &'a dyn Clock, ttl_days: i64) -> Self {
        Self {
            kv,
            clock,
            ttl: Duration::try_days(ttl_days).unwrap_or(Duration::MAX),
        }
    }

    /// Cached dishes for `key`, or `None` when absent or expired.
    pub fn lookup(&self, key: &CacheKey) -> Option<Vec<Dish>> {
        let entry: WorldwideDishesCache = self.kv.read(&key.storage_key())?;

        if entry.key() != *key {
            tracing::warn!(key = %key, stored = %entry.key(), "cache entry stored under wrong key");
            return None;
        }
        if !is_valid(&entry, self.clock.now(), self.ttl) {
            tracing::debug!(key = %key, fetched_at = %entry.timestamp, "cache entry expired");
            return None;
        }

        tracing::debug!(key = %key, dishes = entry.dishes.len(), "cache hit");
        Some(entry.dishes)
    }

    /// Overwrite the entry for `key` with freshly fetched `dishes`.
    pub fn store(&self, key: &CacheKey, dishes: Vec<Dish>) -> Result<(), KvError> {
        let entry = WorldwideDishesCache {
            country_code: key.country_code.clone(),
            month: key.month,
            year: key.year,
            dishes,
            timestamp: self.clock.now(),
        };
        self.kv.write(&key.storage_key(), &entry)
    }

    /// Serve from cache, or fetch from `source` and cache the result.
    ///
    /// A failed cache write does not fail the call; the fetched dishes are
    /// still returned.
    pub fn get_or_fetch(&self, key: &CacheKey, source: &dyn DishSource) -> anyhow::Result<Vec<Dish>> {
        if let Some(dishes) = self.lookup(key) {
            return Ok(dishes);
        }

        tracing::debug!(key = %key, "cache miss, fetching");
        let dishes = source.fetch_dishes(&key.country_code, key.month, key.year)?;
        if let Err(e) = self.store(key, dishes.clone()) {
            tracing::warn!(key = %key, error = %e, "failed to cache fetched dishes");
        }
        Ok(dishes)
    }

    /// Every cache entry currently stored, with its validity.
    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let keys = match self.kv.medium().keys_with_prefix(CACHE_KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache keys");
                return Vec::new();
            }
        };
        let now = self.clock.now();

        keys.into_iter()
            .filter_map(|key| {
                let entry: WorldwideDishesCache = self.kv.read(&key)?;
                Some(CacheEntryInfo {
                    valid: is_valid(&entry, now, self.ttl),
                    dish_count: entry.dishes.len(),
                    fetched_at: entry.timestamp,
                    key,
                })
            })
            .collect()
    }

    /// Delete every expired or undecodable cache entry. Returns how many keys were removed.
    ///
    /// Entries the medium fails to read or delete are left in place and not counted.
    pub fn purge_expired(&self) -> usize {
        let medium = self.kv.medium();
        let keys = match medium.keys_with_prefix(CACHE_KEY_PREFIX) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache keys");
                return 0;
            }
        };
        let now = self.clock.now();

        let mut removed = 0;
        for key in keys {
            let raw = match medium.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to read cache entry, keeping it");
                    continue;
                }
            };
            let keep = decode::<WorldwideDishesCache>(&raw)
                .is_ok_and(|entry| is_valid(&entry, now, self.ttl));
            if !keep && self.kv.remove(&key).is_ok() {
                removed += 1;
            }
        }

        tracing::info!(removed, "purged expired dish cache entries");
        removed
    }
}
