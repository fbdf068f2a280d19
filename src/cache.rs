use std::{
    collections::HashMap,
    hash::Hash,
    time::{
        Duration,
        Instant,
    },
};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Keyed values that go stale after a fixed time-to-live.
///
/// Callers pass `now` explicitly so expiry can be tested without sleeping.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, Entry { value, stored_at: now });
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_served() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("subjects", vec![1, 2], start);

        assert_eq!(cache.get(&"subjects", start + Duration::from_secs(59)), Some(vec![1, 2]));
    }

    #[test]
    fn entries_expire_at_ttl() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("subjects", 1, start);

        assert_eq!(cache.get(&"subjects", start + Duration::from_secs(60)), None);
    }

    #[test]
    fn invalidate_and_clear_drop_entries() {
        let now = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1, now);
        cache.insert("b", 2, now);

        cache.invalidate(&"a");
        assert_eq!(cache.get(&"a", now), None);
        assert_eq!(cache.get(&"b", now), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }
}
