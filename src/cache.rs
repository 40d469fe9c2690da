//! Coarse query cache for fetched payloads.
//!
//! Keys are string vectors (`["atoms", molecule_id]` style) so related
//! entries share a prefix. Invalidation after a mutation drops the whole
//! prefix; the next fetch repopulates it.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<Vec<String>, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[&str]) -> Option<Value> {
        let key = owned_key(key);
        self.entries.lock().ok()?.get(&key).cloned()
    }

    pub fn insert(&self, key: &[&str], value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(owned_key(key), value);
        }
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &[&str]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !starts_with(key, prefix));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn owned_key(key: &[&str]) -> Vec<String> {
    key.iter().map(|k| k.to_string()).collect()
}

fn starts_with(key: &[String], prefix: &[&str]) -> bool {
    key.len() >= prefix.len() && key.iter().zip(prefix.iter()).all(|(k, p)| k == p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let cache = QueryCache::new();
        assert!(cache.get(&["capsules", "c1"]).is_none());

        cache.insert(&["capsules", "c1"], json!({ "id": "c1" }));
        assert_eq!(cache.get(&["capsules", "c1"]).unwrap()["id"], "c1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prefix_invalidation_spares_other_prefixes() {
        let cache = QueryCache::new();
        cache.insert(&["atoms", "m1"], json!(1));
        cache.insert(&["atoms", "m2"], json!(2));
        cache.insert(&["capsules", "c1"], json!(3));

        cache.invalidate_prefix(&["atoms"]);
        assert!(cache.get(&["atoms", "m1"]).is_none());
        assert!(cache.get(&["atoms", "m2"]).is_none());
        assert_eq!(cache.get(&["capsules", "c1"]).unwrap(), json!(3));
    }

    #[test]
    fn test_exact_key_counts_as_its_own_prefix() {
        let cache = QueryCache::new();
        cache.insert(&["capsules"], json!(1));
        cache.invalidate_prefix(&["capsules"]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.insert(&["a"], json!(1));
        cache.insert(&["b"], json!(2));
        cache.clear();
        assert!(cache.is_empty());
    }
}
