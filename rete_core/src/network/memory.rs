//! Append-only storage shared by fact memories, partial-match memories and adapters.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crate::config::DuplicatePolicy;

/// Insertion-ordered storage that only grows.
///
/// Items are held once, in `items`. The index maps a hash to the position of
/// the first occurrence of each distinct item with that hash.
#[derive(Debug, Clone)]
pub struct Memory<T> {
    items: Vec<T>,
    index: HashMap<u64, Vec<usize>>,
    hasher: RandomState,
    distinct: usize,
}

impl<T> Default for Memory<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            hasher: RandomState::new(),
            distinct: 0,
        }
    }
}

impl<T: Eq + Hash> Memory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item` under `policy`.
    ///
    /// Returns whether the item was stored, i.e. whether it must be forwarded.
    pub fn insert(&mut self, item: T, policy: DuplicatePolicy) -> bool {
        let hash = self.hasher.hash_one(&item);
        let seen = self.position(hash, &item).is_some();
        if seen && policy == DuplicatePolicy::Idempotent {
            return false;
        }
        if !seen {
            self.index.entry(hash).or_default().push(self.items.len());
            self.distinct += 1;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.position(self.hasher.hash_one(item), item).is_some()
    }

    fn position(&self, hash: u64, item: &T) -> Option<usize> {
        self.index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&at| self.items[at] == *item)
    }

    /// All stored items, in arrival order, repeats included.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items stored.
    pub fn distinct(&self) -> usize {
        self.distinct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent_insert() {
        let mut memory = Memory::new();
        assert!(memory.insert("a", DuplicatePolicy::Idempotent));
        assert!(!memory.insert("a", DuplicatePolicy::Idempotent));
        assert!(memory.insert("b", DuplicatePolicy::Idempotent));

        assert_eq!(memory.as_slice(), &["a", "b"]);
        assert_eq!(memory.distinct(), 2);
    }

    #[test]
    fn test_cumulative_insert() {
        let mut memory = Memory::new();
        assert!(memory.insert("a", DuplicatePolicy::Cumulative));
        assert!(memory.insert("a", DuplicatePolicy::Cumulative));

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.distinct(), 1);
        assert!(memory.contains(&"a"));
        assert!(!memory.contains(&"b"));
    }

    /// Hashes every value to the same bucket.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Collide(&'static str);

    impl Hash for Collide {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            0u8.hash(state);
        }
    }

    #[test]
    fn test_colliding_hashes_stay_distinct() {
        let mut memory = Memory::new();
        assert!(memory.insert(Collide("a"), DuplicatePolicy::Idempotent));
        assert!(memory.insert(Collide("b"), DuplicatePolicy::Idempotent));
        assert!(!memory.insert(Collide("a"), DuplicatePolicy::Idempotent));
        assert!(memory.insert(Collide("b"), DuplicatePolicy::Cumulative));

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.distinct(), 2);
        assert!(memory.contains(&Collide("b")));
        assert!(!memory.contains(&Collide("c")));
    }
}
