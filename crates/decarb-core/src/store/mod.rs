//! Key-value persistence for calculations, projects and portfolios.
//!
//! Records are grouped by kind and keyed by their opaque id. `save` is a
//! full replace; there is no partial update.

pub mod ids;
pub mod json_file;
pub mod memory;
pub mod records;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DecarbError;
use crate::DecarbResult;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A value that can be persisted under a key.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Namespace of this record type ("calculations", "projects", ...).
    const KIND: &'static str;

    fn key(&self) -> &str;

    /// Set `created_at` if unset and `updated_at` to `now`.
    fn stamp(&mut self, _now: DateTime<Utc>) {}

    /// Restore invariants before a save and after a load.
    fn normalize(&mut self) {}
}

/// Raw storage plus typed record operations built on top of it.
pub trait RecordStore {
    fn put_raw(&mut self, kind: &str, key: &str, value: serde_json::Value) -> DecarbResult<()>;
    fn get_raw(&self, kind: &str, key: &str) -> DecarbResult<Option<serde_json::Value>>;
    /// Keys of one kind, sorted.
    fn keys(&self, kind: &str) -> DecarbResult<Vec<String>>;
    /// Returns false when nothing was stored under the key.
    fn remove(&mut self, kind: &str, key: &str) -> DecarbResult<bool>;

    /// Normalise, stamp and store `record`, replacing any previous value.
    /// Returns the record as stored.
    fn save<R: Record>(&mut self, record: &R) -> DecarbResult<R> {
        if record.key().trim().is_empty() {
            return Err(DecarbError::InvalidInput {
                field: "id".into(),
                reason: format!("{} record has an empty key", R::KIND),
            });
        }
        let mut stored = record.clone();
        stored.normalize();
        stored.stamp(Utc::now());
        let key = stored.key().to_string();
        self.put_raw(R::KIND, &key, serde_json::to_value(&stored)?)?;
        tracing::debug!(kind = R::KIND, key = %key, "record saved");
        Ok(stored)
    }

    fn load<R: Record>(&self, key: &str) -> DecarbResult<R> {
        let value = self.get_raw(R::KIND, key)?.ok_or_else(|| DecarbError::NotFound {
            kind: R::KIND.into(),
            key: key.into(),
        })?;
        let mut record: R = serde_json::from_value(value)?;
        record.normalize();
        tracing::debug!(kind = R::KIND, key, "record loaded");
        Ok(record)
    }

    /// Load, or `None` when the key is absent.
    fn find<R: Record>(&self, key: &str) -> DecarbResult<Option<R>> {
        match self.load(key) {
            Ok(record) => Ok(Some(record)),
            Err(DecarbError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list<R: Record>(&self) -> DecarbResult<Vec<String>> {
        self.keys(R::KIND)
    }

    /// Every record of one kind, in key order.
    fn load_all<R: Record>(&self) -> DecarbResult<Vec<R>> {
        self.keys(R::KIND)?.iter().map(|k| self.load(k)).collect()
    }

    fn delete<R: Record>(&mut self, key: &str) -> DecarbResult<bool> {
        let removed = self.remove(R::KIND, key)?;
        tracing::debug!(kind = R::KIND, key, removed, "record deleted");
        Ok(removed)
    }
}
