//! Indexed binary min-heap
//!
//! Open list shared by the three planners. Each item is stored at most once;
//! an index map from item to heap slot makes reposition and arbitrary removal
//! O(log n) instead of a linear scan.
//!
//! # Example
//!
//! ```rust
//! use warenav_library::algorithms::priority_queue::IndexedPriorityQueue;
//!
//! let mut open = IndexedPriorityQueue::new();
//! open.enqueue("shelf", 30);
//! open.enqueue("dock", 10);
//! open.enqueue("shelf", 5); // repositions, no duplicate
//!
//! assert_eq!(open.len(), 2);
//! assert_eq!(open.peek_top_key().unwrap(), 5);
//! assert_eq!(open.dequeue().unwrap(), "shelf");
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use warenav_core::{NavError, NavResult};

/// Binary min-heap with an item → slot index
#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<T, K> {
    heap: Vec<(T, K)>,
    index: HashMap<T, usize>,
}

impl<T, K> Default for IndexedPriorityQueue<T, K>
where
    T: Eq + Hash + Clone,
    K: Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> IndexedPriorityQueue<T, K>
where
    T: Eq + Hash + Clone,
    K: Ord + Copy,
{
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    /// Key currently associated with `item`
    pub fn key_of(&self, item: &T) -> Option<K> {
        let slot = *self.index.get(item)?;
        self.heap
            .get(slot)
            .filter(|(held, _)| held == item)
            .map(|(_, key)| *key)
    }

    /// Insert `item`, or move it to `key` if it is already queued
    pub fn enqueue(&mut self, item: T, key: K) {
        if let Some(slot) = self.checked_slot(&item) {
            let old_key = self.heap[slot].1;
            self.heap[slot].1 = key;
            if key < old_key {
                self.sift_up(slot);
            } else {
                self.sift_down(slot);
            }
            return;
        }

        self.heap.push((item.clone(), key));
        let slot = self.heap.len() - 1;
        self.index.insert(item, slot);
        self.sift_up(slot);
    }

    /// Remove and return the minimum item
    pub fn dequeue(&mut self) -> NavResult<T> {
        self.pop().map(|(item, _)| item).ok_or(NavError::EmptyQueue)
    }

    /// Remove and return the minimum item with its key
    pub fn pop(&mut self) -> Option<(T, K)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        if !self.swap(0, last) {
            return self.pop();
        }
        let (item, key) = self.heap.pop()?;
        self.index.remove(&item);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, key))
    }

    /// Smallest key in the queue
    pub fn peek_top_key(&self) -> NavResult<K> {
        self.heap.first().map(|(_, key)| *key).ok_or(NavError::EmptyQueue)
    }

    /// Smallest item without removing it
    pub fn peek(&self) -> Option<&T> {
        self.heap.first().map(|(item, _)| item)
    }

    /// Remove `item` if queued; no-op otherwise
    pub fn remove(&mut self, item: &T) -> Option<K> {
        let slot = self.checked_slot(item)?;
        let last = self.heap.len() - 1;

        if !self.swap(slot, last) {
            return self.remove(item);
        }
        let (removed, key) = self.heap.pop()?;
        self.index.remove(&removed);

        if slot < self.heap.len() {
            // The former last element can belong on either side of `slot`
            self.sift_down(slot);
            self.sift_up(slot);
        }
        Some(key)
    }

    /// Items and keys in heap order (not sorted)
    pub fn iter(&self) -> impl Iterator<Item = (&T, &K)> {
        self.heap.iter().map(|(item, key)| (item, key))
    }

    /// Heap property holds and every slot is indexed correctly
    pub fn is_consistent(&self) -> bool {
        if self.index.len() != self.heap.len() {
            return false;
        }
        self.heap.iter().enumerate().all(|(slot, (item, key))| {
            let indexed = self.index.get(item) == Some(&slot);
            let ordered = slot == 0 || self.heap[(slot - 1) / 2].1 <= *key;
            indexed && ordered
        })
    }

    /// Rebuild the index map and the heap order from the element list
    pub fn rebuild(&mut self) {
        let mut seen = HashMap::with_capacity(self.heap.len());
        // Keep the first copy of any duplicate
        self.heap.retain(|(item, _)| seen.insert(item.clone(), ()).is_none());

        self.index.clear();
        for (slot, (item, _)) in self.heap.iter().enumerate() {
            self.index.insert(item.clone(), slot);
        }
        for slot in (0..self.heap.len() / 2).rev() {
            self.sift_down(slot);
        }
    }

    /// Slot of `item`, rebuilding first if its index entry is stale
    fn checked_slot(&mut self, item: &T) -> Option<usize> {
        let slot = *self.index.get(item)?;
        if self.heap.get(slot).is_some_and(|(held, _)| held == item) {
            return Some(slot);
        }

        tracing::error!(
            slot,
            len = self.heap.len(),
            indexed = self.index.len(),
            "priority queue index entry is stale, rebuilding"
        );
        self.rebuild();
        self.index.get(item).copied()
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[parent].1 <= self.heap[slot].1 {
                break;
            }
            if !self.swap(slot, parent) {
                return;
            }
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            if !self.swap(slot, smallest) {
                return;
            }
            slot = smallest;
        }
    }

    /// Swap two slots and fix their index entries.
    ///
    /// Returns `false` if the index map was found corrupted, in which case the
    /// whole queue has been rebuilt and the caller must stop sifting.
    fn swap(&mut self, a: usize, b: usize) -> bool {
        let consistent = self.index.get(&self.heap[a].0) == Some(&a)
            && self.index.get(&self.heap[b].0) == Some(&b);

        if !consistent {
            tracing::error!(
                slots = ?(a, b),
                len = self.heap.len(),
                indexed = self.index.len(),
                "priority queue index out of sync, rebuilding"
            );
            self.rebuild();
            return false;
        }

        self.heap.swap(a, b);
        self.index.insert(self.heap[a].0.clone(), a);
        self.index.insert(self.heap[b].0.clone(), b);
        true
    }
}
