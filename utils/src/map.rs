use std::hash::Hash;

use fnv::FnvHashMap;

/// Thin FNV-hashed map, suited to small integer keys such as Galois elements.
#[derive(Clone, Debug)]
pub struct Map<K, V>(pub FnvHashMap<K, V>);

impl<K: Eq + Hash, V> Map<K, V> {
    pub fn new() -> Self {
        Self(FnvHashMap::<K, V>::default())
    }

    pub fn insert(&mut self, k: K, data: V) -> Option<V> {
        self.0.insert(k, data)
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.0.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }
}

impl<K: Eq + Hash, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Map;

    #[test]
    fn insert_get() {
        let mut map: Map<usize, &str> = Map::new();
        assert!(map.is_empty());
        assert_eq!(map.insert(3, "three"), None);
        assert_eq!(map.insert(3, "trois"), Some("three"));
        assert_eq!(map.get(&3), Some(&"trois"));
        assert!(map.contains_key(&3));
        assert!(!map.contains_key(&5));
        assert_eq!(map.len(), 1);
    }
}
