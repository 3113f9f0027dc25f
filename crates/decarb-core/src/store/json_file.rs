use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::DecarbError;
use crate::store::RecordStore;
use crate::DecarbResult;

/// One pretty-printed JSON file per record: `<root>/<kind>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> DecarbResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "json store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: &str, key: &str) -> DecarbResult<PathBuf> {
        if key.is_empty() {
            return Err(DecarbError::InvalidInput {
                field: "key".into(),
                reason: "file store keys cannot be empty".into(),
            });
        }
        Ok(self.root.join(kind).join(format!("{}.json", encode_key(key))))
    }
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]` so any key maps to a
/// single plain file name.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Inverse of [`encode_key`]; `None` for a stem this store did not write.
fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl RecordStore for JsonFileStore {
    fn put_raw(&mut self, kind: &str, key: &str, value: serde_json::Value) -> DecarbResult<()> {
        let path = self.path_for(kind, key)?;
        fs::create_dir_all(self.root.join(kind))?;
        let body = serde_json::to_string_pretty(&value)?;
        // write-then-rename
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get_raw(&self, kind: &str, key: &str) -> DecarbResult<Option<serde_json::Value>> {
        let path = self.path_for(kind, key)?;
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self, kind: &str) -> DecarbResult<Vec<String>> {
        let dir = self.root.join(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn remove(&mut self, kind: &str, key: &str) -> DecarbResult<bool> {
        let path = self.path_for(kind, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("decarb-json-store-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_files_per_key() {
        let root = temp_root("files");
        let mut store = JsonFileStore::open(&root).unwrap();
        store.put_raw("projects", "P-1", json!({"id": "P-1"})).unwrap();
        assert!(root.join("projects").join("P-1.json").exists());
        assert_eq!(store.keys("projects").unwrap(), vec!["P-1"]);
        assert_eq!(store.keys("calculations").unwrap(), Vec::<String>::new());
        assert!(store.remove("projects", "P-1").unwrap());
        assert_eq!(store.get_raw("projects", "P-1").unwrap(), None);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_path_like_keys_stay_in_kind_dir() {
        let root = temp_root("keys");
        let mut store = JsonFileStore::open(&root).unwrap();
        store.put_raw("projects", "../escape", json!({"n": 1})).unwrap();
        store.put_raw("projects", "a/b", json!({"n": 2})).unwrap();
        assert!(!root.join("escape.json").exists());
        assert!(root.join("projects").join("%2E%2E%2Fescape.json").exists());
        assert_eq!(store.keys("projects").unwrap(), vec!["../escape", "a/b"]);
        assert_eq!(store.get_raw("projects", "a/b").unwrap(), Some(json!({"n": 2})));
        assert!(store.put_raw("projects", "", json!({})).is_err());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("A B-STE_1.5%"), "A%20B-STE_1%2E5%25");
        assert_eq!(decode_key("A%20B-STE_1%2E5%25").as_deref(), Some("A B-STE_1.5%"));
        assert_eq!(decode_key(&encode_key("Zürich")).as_deref(), Some("Zürich"));
        assert_eq!(decode_key("bad%2"), None);
    }
}
