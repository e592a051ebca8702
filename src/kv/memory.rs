//! In-process medium, used for tests and for running without a database file.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{KvError, KvMedium};

#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: RefCell<BTreeMap<String, String>>,
    max_value_bytes: Option<u64>,
    unavailable: Cell<bool>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// A medium that rejects any single value longer than `max_value_bytes`.
    pub fn with_quota(max_value_bytes: u64) -> Self {
        Self {
            max_value_bytes: Some(max_value_bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent operation fail with [`KvError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_available(&self) -> Result<(), KvError> {
        if self.unavailable.get() {
            return Err(KvError::Unavailable("memory medium switched off".into()));
        }
        Ok(())
    }
}

impl KvMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.check_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.check_available()?;
        let size = value.len() as u64;
        if let Some(limit) = self.max_value_bytes.filter(|limit| size > *limit) {
            return Err(KvError::QuotaExceeded {
                key: key.to_string(),
                size,
                limit,
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KvError> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        self.check_available()?;
        Ok(self
            .entries
            .borrow()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
