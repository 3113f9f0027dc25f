use std::collections::BTreeMap;

use crate::store::RecordStore;
use crate::DecarbResult;

/// In-process store, mainly for tests and the bindings.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<(String, String), serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn put_raw(&mut self, kind: &str, key: &str, value: serde_json::Value) -> DecarbResult<()> {
        self.records.insert((kind.to_string(), key.to_string()), value);
        Ok(())
    }

    fn get_raw(&self, kind: &str, key: &str) -> DecarbResult<Option<serde_json::Value>> {
        Ok(self.records.get(&(kind.to_string(), key.to_string())).cloned())
    }

    fn keys(&self, kind: &str) -> DecarbResult<Vec<String>> {
        Ok(self
            .records
            .keys()
            .filter(|(k, _)| k == kind)
            .map(|(_, key)| key.clone())
            .collect())
    }

    fn remove(&mut self, kind: &str, key: &str) -> DecarbResult<bool> {
        Ok(self.records.remove(&(kind.to_string(), key.to_string())).is_some())
    }
}
