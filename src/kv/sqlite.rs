//! SQLite-backed medium over the `kv_entries` table.

use rusqlite::{params, Connection, OptionalExtension};

use super::{KvError, KvMedium};

/// Owns the database connection; every `set` is a single-row upsert.
pub struct SqliteMedium {
    conn: Connection,
    max_value_bytes: Option<u64>,
}

impl SqliteMedium {
    /// Wrap a connection whose schema has already been initialized.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            max_value_bytes: None,
        }
    }

    pub fn with_quota(mut self, max_value_bytes: u64) -> Self {
        self.max_value_bytes = Some(max_value_bytes);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl KvMedium for SqliteMedium {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let size = value.len() as u64;
        if let Some(limit) = self.max_value_bytes.filter(|limit| size > *limit) {
            return Err(KvError::QuotaExceeded {
                key: key.to_string(),
                size,
                limit,
            });
        }

        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KvError> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        // substr comparison avoids LIKE wildcards inside the prefix
        let mut stmt = self.conn.prepare(
            "SELECT key FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}
