//! Bounded memory of recently seen push ids.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Remembers the last `capacity` ids. A capacity of 0 disables dedup and
/// accepts everything.
#[derive(Debug, Clone)]
pub struct DedupWindow<K> {
    capacity: usize,
    order: VecDeque<K>,
    seen: HashSet<K>,
}

impl<K: Copy + Eq + Hash> DedupWindow<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
            seen: HashSet::with_capacity(capacity.min(1024)),
        }
    }

    /// Record `id`. Returns `false` if it was already in the window.
    pub fn insert(&mut self, id: K) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn contains(&self, id: &K) -> bool {
        self.seen.contains(id)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
