//! Concurrent keyed storage backing the balancer's stats

use dashmap::DashMap;
use std::hash::Hash;

/// Thread-safe key-value store
///
/// Every operation locks only the shard holding its key. `for_each` visits a
/// snapshot, so the callback may freely read or write the store.
///
/// # Examples
///
/// ```
/// use esox_balancer::ConcurrentStore;
///
/// let store = ConcurrentStore::new();
/// store.set("a", 1);
/// store.set("b", 2);
///
/// assert_eq!(store.get(&"a"), Some(1));
/// assert_eq!(store.delete(&"a"), Some(1));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug)]
pub struct ConcurrentStore<K: Eq + Hash, V> {
    map: DashMap<K, V>,
}

impl<K: Eq + Hash, V> Default for ConcurrentStore<K, V> {
    fn default() -> Self {
        Self { map: DashMap::new() }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ConcurrentStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    /// Insert or overwrite, returning the previous value
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    pub fn delete(&self, key: &K) -> Option<V> {
        self.map.remove(key).map(|(_, value)| value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Visit every entry of a snapshot taken before the first call
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.snapshot() {
            visit(&key, &value);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&self) {
        self.map.clear();
    }

    fn snapshot(&self) -> Vec<(K, V)> {
        self.map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
