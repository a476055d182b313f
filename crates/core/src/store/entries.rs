use fxhash::{FxHashMap, FxHashSet};

/// The in-memory session map. Keys keep the position of their first insertion
/// until they are removed.
///
/// Removed keys are remembered until they are written again, so a stale copy
/// left in a backing store that failed to delete it is never read back.
#[derive(Debug, Default, Clone)]
pub(crate) struct SessionEntries {
    values: FxHashMap<String, String>,
    order: Vec<String>,
    removed: FxHashSet<String>,
    cleared: bool,
}

impl SessionEntries {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: String, value: String) {
        self.removed.remove(&key);
        if !self.values.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.values.insert(key, value);
    }

    /// Inserts only when the key is not already held. Returns whether the
    /// value was stored.
    pub fn insert_if_absent(&mut self, key: String, value: String) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        self.insert(key, value);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        self.removed.insert(key.to_owned());
        removed
    }

    /// Empties the map. Backing stores are not consulted on a miss afterwards.
    pub fn clear(&mut self) {
        self.removed.extend(self.order.drain(..));
        self.values.clear();
        self.cleared = true;
    }

    /// Whether a miss on `key` may be answered from a backing store.
    pub fn allows_read_through(&self, key: &str) -> bool {
        !self.cleared && !self.removed.contains(key)
    }

    pub fn key(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> SessionEntries {
        let mut entries = SessionEntries::default();
        for (k, v) in pairs {
            entries.insert(k.to_string(), v.to_string());
        }
        entries
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut entries = entries(&[("a", "1"), ("b", "2")]);
        entries.insert("a".into(), "3".into());

        assert_eq!(entries.keys(), ["a", "b"]);
        assert_eq!(entries.get("a"), Some("3"));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn reinsert_after_remove_moves_to_end() {
        let mut entries = entries(&[("a", "1"), ("b", "2"), ("c", "3")]);
        assert_eq!(entries.remove("a"), Some("1".to_string()));
        entries.insert("a".into(), "4".into());

        assert_eq!(entries.keys(), ["b", "c", "a"]);
        assert_eq!(entries.key(2), Some("a"));
        assert_eq!(entries.key(3), None);
    }

    #[test]
    fn removing_missing_key_is_noop() {
        let mut entries = entries(&[("a", "1")]);
        assert_eq!(entries.remove("zzz"), None);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn insert_if_absent_does_not_overwrite() {
        let mut entries = entries(&[("a", "1")]);
        assert!(!entries.insert_if_absent("a".into(), "2".into()));
        assert!(entries.insert_if_absent("b".into(), "3".into()));

        assert_eq!(entries.get("a"), Some("1"));
        assert_eq!(entries.get("b"), Some("3"));
    }

    #[test]
    fn removed_keys_block_read_through_until_rewritten() {
        let mut entries = entries(&[("a", "1")]);
        assert!(entries.allows_read_through("a"));

        entries.remove("a");
        entries.remove("never-set");
        assert!(!entries.allows_read_through("a"));
        assert!(!entries.allows_read_through("never-set"));
        assert!(entries.allows_read_through("b"));

        entries.insert("a".into(), "2".into());
        assert!(entries.allows_read_through("a"));
    }

    #[test]
    fn clear_blocks_read_through() {
        let mut entries = entries(&[("a", "1")]);
        entries.clear();

        assert!(!entries.allows_read_through("a"));
        assert!(!entries.allows_read_through("b"));
    }

    #[test]
    fn clear_empties_everything() {
        let mut entries = entries(&[("a", "1"), ("b", "2")]);
        entries.clear();

        assert!(entries.is_empty());
        assert!(!entries.contains("a"));
        assert_eq!(entries.key(0), None);
    }
}
