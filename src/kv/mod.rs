//! Durable key-value store adapter.
//!
//! [`KvMedium`] is the opaque persistent medium (string keys, string values).
//! [`KvStore`] layers typed JSON access on top of it: values are written as a
//! versioned envelope, full overwrite only, and reads never fail: a missing key,
//! an unreadable medium, or a value that no longer decodes into the requested
//! shape all come back as `None`, with a warning logged for the latter two.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryMedium;
pub use sqlite::SqliteMedium;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version stamped into every value written through [`KvStore`].
pub const ENVELOPE_VERSION: u32 = 1;

/// Errors produced by a medium or by encoding a value.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("value for {key} is {size} bytes, over the {limit} byte quota")]
    QuotaExceeded { key: String, size: u64, limit: u64 },

    #[error("stored value has envelope version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("value for {key} does not survive encoding: {reason}")]
    Unencodable { key: String, reason: String },
}

/// A persistent string-keyed medium.
///
/// Implementations must make `set` a whole-value replacement: a failed `set`
/// leaves the previous value for that key untouched.
pub trait KvMedium {
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    fn delete(&self, key: &str) -> Result<(), KvError>;

    /// All stored keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError>;
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvelopeIn {
    version: u32,
    data: serde_json::Value,
}

/// Typed JSON access over a borrowed [`KvMedium`].
#[derive(Clone, Copy)]
pub struct KvStore<'a> {
    medium: &'a dyn KvMedium,
}

impl<'a> KvStore<'a> {
    pub fn new(medium: &'a dyn KvMedium) -> Self {
        Self { medium }
    }

    pub fn medium(&self) -> &'a dyn KvMedium {
        self.medium
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is absent, when the medium fails, or when the
    /// stored value does not decode into `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed, treating as absent");
                return None;
            }
        };

        match decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is corrupt, treating as absent");
                None
            }
        }
    }

    /// Read a JSON array collection; absent or corrupt collections read as empty.
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.read(key).unwrap_or_default()
    }

    /// Encode `value` and overwrite `key` with it.
    ///
    /// The encoded form must decode back into an equal `T`. A value that would
    /// not (JSON has no NaN or infinity, so those become `null`) is rejected and
    /// `key` keeps its previous value.
    pub fn write<T: Serialize + DeserializeOwned>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let data = serde_json::to_value(value)?;
        let reread = T::deserialize(&data)
            .map_err(|e| e.to_string())
            .and_then(|decoded| serde_json::to_value(&decoded).map_err(|e| e.to_string()))
            .and_then(|again| {
                if again == data {
                    Ok(())
                } else {
                    Err("value changes when read back".to_string())
                }
            });
        if let Err(reason) = reread {
            tracing::warn!(key, %reason, "refusing to store value that would not read back");
            return Err(KvError::Unencodable {
                key: key.to_string(),
                reason,
            });
        }

        let encoded = serde_json::to_string(&EnvelopeOut {
            version: ENVELOPE_VERSION,
            data: &data,
        })?;

        self.medium.set(key, &encoded).inspect_err(|e| {
            tracing::warn!(key, error = %e, "storage write failed");
        })
    }

    /// Delete `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), KvError> {
        self.medium.delete(key).inspect_err(|e| {
            tracing::warn!(key, error = %e, "storage delete failed");
        })
    }
}

/// Decode a stored value, accepting both the versioned envelope and a bare payload.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, KvError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let payload = match serde_json::from_value::<EnvelopeIn>(value.clone()) {
        Ok(envelope) if envelope.version > ENVELOPE_VERSION => {
            return Err(KvError::UnsupportedVersion {
                found: envelope.version,
                supported: ENVELOPE_VERSION,
            });
        }
        Ok(envelope) => envelope.data,
        // written before values carried an envelope
        Err(_) => value,
    };

    Ok(serde_json::from_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        name: String,
        item_count: u32,
    }

    fn sample() -> Sample {
        Sample {
            name: "flour".into(),
            item_count: 3,
        }
    }

    #[test]
    fn absent_key_reads_none() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        assert_eq!(kv.read::<Sample>("missing"), None);
    }

    #[test]
    fn write_then_read() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.write("sample", &sample()).unwrap();
        assert_eq!(kv.read::<Sample>("sample"), Some(sample()));
    }

    #[test]
    fn written_value_carries_envelope() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.write("sample", &sample()).unwrap();

        let raw = medium.get("sample").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["data"]["itemCount"], 3);
    }

    #[test]
    fn bare_payload_is_accepted() {
        let medium = MemoryMedium::new();
        medium.set("sample", r#"{"name":"flour","itemCount":3}"#).unwrap();
        let kv = KvStore::new(&medium);
        assert_eq!(kv.read::<Sample>("sample"), Some(sample()));
    }

    #[test]
    fn corrupt_json_reads_none() {
        let medium = MemoryMedium::new();
        medium.set("sample", "{not json").unwrap();
        let kv = KvStore::new(&medium);
        assert_eq!(kv.read::<Sample>("sample"), None);
    }

    #[test]
    fn shape_mismatch_reads_none() {
        let medium = MemoryMedium::new();
        medium.set("sample", r#"{"version":1,"data":{"name":"flour"}}"#).unwrap();
        let kv = KvStore::new(&medium);
        assert_eq!(kv.read::<Sample>("sample"), None);
    }

    #[test]
    fn newer_envelope_version_reads_none() {
        let medium = MemoryMedium::new();
        medium
            .set("sample", r#"{"version":9,"data":{"name":"flour","itemCount":3}}"#)
            .unwrap();
        let kv = KvStore::new(&medium);
        assert_eq!(kv.read::<Sample>("sample"), None);
    }

    #[test]
    fn corrupt_collection_reads_empty() {
        let medium = MemoryMedium::new();
        medium.set("list", r#"{"oops":true}"#).unwrap();
        let kv = KvStore::new(&medium);
        assert!(kv.read_collection::<Sample>("list").is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let medium = MemoryMedium::with_quota(64);
        let kv = KvStore::new(&medium);
        kv.write("sample", &sample()).unwrap();

        let big = Sample {
            name: "x".repeat(200),
            item_count: 1,
        };
        let err = kv.write("sample", &big).unwrap_err();
        assert!(matches!(err, KvError::QuotaExceeded { .. }));
        assert_eq!(kv.read::<Sample>("sample"), Some(sample()));
    }

    #[test]
    fn unreadable_medium_reads_none() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.write("sample", &sample()).unwrap();
        medium.set_unavailable(true);
        assert_eq!(kv.read::<Sample>("sample"), None);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.remove("missing").unwrap();
        kv.write("sample", &sample()).unwrap();
        kv.remove("sample").unwrap();
        assert_eq!(kv.read::<Sample>("sample"), None);
    }

    #[test]
    fn remove_on_unavailable_medium_reports_failure() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.write("sample", &sample()).unwrap();
        medium.set_unavailable(true);
        assert!(kv.remove("sample").is_err());
        medium.set_unavailable(false);
        assert_eq!(kv.read::<Sample>("sample"), Some(sample()));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reading {
        value: f64,
    }

    #[test]
    fn non_finite_number_is_rejected_and_previous_value_kept() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        kv.write("reading", &vec![Reading { value: 1.5 }]).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = kv
                .write("reading", &vec![Reading { value: 1.5 }, Reading { value: bad }])
                .unwrap_err();
            assert!(matches!(err, KvError::Unencodable { .. }));
        }
        assert_eq!(
            kv.read_collection::<Reading>("reading"),
            vec![Reading { value: 1.5 }]
        );
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OptionalReading {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    }

    #[test]
    fn non_finite_optional_number_is_rejected() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);
        let err = kv
            .write("reading", &OptionalReading { value: Some(f64::NAN) })
            .unwrap_err();
        assert!(matches!(err, KvError::Unencodable { .. }));
        assert!(medium.is_empty());

        kv.write("reading", &OptionalReading { value: None }).unwrap();
    }

    #[test]
    fn arbitrary_floats_read_back_exactly() {
        let medium = MemoryMedium::new();
        let kv = KvStore::new(&medium);

        let readings: Vec<Reading> = (1..=500u32)
            .map(|i| Reading {
                value: f64::from(i) * 7919.123_456_789 / 1_000_003.0 / 7.0,
            })
            .chain([0.1 + 0.2, 1e-300, f64::MAX, f64::MIN_POSITIVE, -2.5e17].map(|value| Reading { value }))
            .collect();
        kv.write("reading", &readings).unwrap();

        assert_eq!(kv.read_collection::<Reading>("reading"), readings);
    }
}
