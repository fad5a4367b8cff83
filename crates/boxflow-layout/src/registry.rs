//! Depth-ordered set of registered layout participants.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// A set of keys ordered deepest-first, ties broken by the key itself.
///
/// Forward iteration yields the deepest entries first, larger keys first
/// within a depth. Reversing the iterator yields the shallowest first with
/// keys ascending. A key appears at most once.
#[derive(Debug, Clone)]
pub struct DepthRegistry<K> {
    ordered: BTreeSet<(Reverse<usize>, Reverse<K>)>,
    depths: HashMap<K, usize>,
}

impl<K: Ord + Hash + Copy> Default for DepthRegistry<K> {
    fn default() -> Self {
        Self {
            ordered: BTreeSet::new(),
            depths: HashMap::new(),
        }
    }
}

impl<K: Ord + Hash + Copy> DepthRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` at `depth`. Returns `false` if it is already present.
    pub fn insert(&mut self, key: K, depth: usize) -> bool {
        if self.depths.contains_key(&key) {
            return false;
        }
        self.depths.insert(key, depth);
        self.ordered.insert((Reverse(depth), Reverse(key)));
        true
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&mut self, key: K) -> bool {
        match self.depths.remove(&key) {
            Some(depth) => self.ordered.remove(&(Reverse(depth), Reverse(key))),
            None => false,
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.depths.contains_key(&key)
    }

    pub fn depth_of(&self, key: K) -> Option<usize> {
        self.depths.get(&key).copied()
    }

    /// Entries with their depths, deepest first. Call `.rev()` for shallowest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (K, usize)> + '_ {
        self.ordered.iter().map(|(Reverse(depth), Reverse(key))| (*key, *depth))
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.depths.clear();
    }
}
