//! Array-backed binary min-heap with index write-back
//!
//! Every item records its own position (see `QueueItem`), so removal of an
//! arbitrary item is O(log n): look up the recorded index, swap with the
//! last slot, shrink, and repair order at the vacated position.
//!
//! # Complexity
//!
//! - Push: O(log n)
//! - Pop min: O(log n)
//! - Remove at index: O(log n)
//! - Peek front / back: O(1)
//!
//! The store is not thread-safe. The queue wraps it in a mutex and never
//! touches it without the lock held.

use crate::error::StoreViolation;
use crate::item::QueueItem;

/// Min-heap of items ordered by `QueueItem::comes_before`.
///
/// Invariants, holding after every public method returns:
///
/// - for every position `i > 0`, `items[i]` does not come before
///   `items[(i - 1) / 2]`
/// - `items[i].queue_index() == Some(i)` for every stored item
///
/// Equal items leave in unspecified order.
pub struct OrderedStore<T: QueueItem> {
    /// Heap-ordered items
    items: Vec<T>,
}

impl<T: QueueItem> OrderedStore<T> {
    /// Create an empty store
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty store with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Item at the root (the minimum), if any
    #[inline]
    pub fn peek_front(&self) -> Option<&T> {
        self.items.first()
    }

    /// Item in the last array slot, if any.
    ///
    /// This is *not* the maximum; it is whatever leaf was placed last.
    #[inline]
    pub fn peek_back(&self) -> Option<&T> {
        self.items.last()
    }

    /// Item at a heap position
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterate items in heap (array) order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Insert an item.
    pub fn push(&mut self, item: T) {
        let pos = self.items.len();
        item.set_queue_index(Some(pos));
        self.items.push(item);
        self.sift_up(pos);

        debug_verify(self);
    }

    /// Remove and return the minimum item, or `None` if empty.
    ///
    /// The returned item's index is cleared to `None`.
    pub fn pop_min(&mut self) -> Option<T> {
        let last = self.items.len().checked_sub(1)?;
        self.swap(0, last);

        let item = self.items.pop()?;
        item.set_queue_index(None);

        if !self.items.is_empty() {
            self.sift_down(0);
        }

        debug_verify(self);
        Some(item)
    }

    /// Remove and return the item at heap position `index`.
    ///
    /// Returns `None` if `index >= len()`. The element moved into the
    /// vacated slot may be out of order in either direction, so it is
    /// sifted up or down as needed.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let len = self.items.len();
        if index >= len {
            return None;
        }

        let last = len - 1;
        self.swap(index, last);

        let item = self.items.pop()?;
        item.set_queue_index(None);

        if index < self.items.len() && !self.sift_up(index) {
            self.sift_down(index);
        }

        debug_verify(self);
        Some(item)
    }

    /// Remove every item, clearing their recorded indices.
    pub fn clear(&mut self) {
        for item in &self.items {
            item.set_queue_index(None);
        }
        self.items.clear();
    }

    /// Check heap order and index synchronization.
    ///
    /// O(n). Used by tests and by the `debug-assertions` feature.
    pub fn verify(&self) -> Result<(), StoreViolation> {
        for (position, item) in self.items.iter().enumerate() {
            let recorded = item.queue_index();
            if recorded != Some(position) {
                return Err(StoreViolation::IndexMismatch { position, recorded });
            }

            if position > 0 {
                let parent = (position - 1) / 2;
                if item.comes_before(&self.items[parent]) {
                    return Err(StoreViolation::HeapOrder {
                        parent,
                        child: position,
                    });
                }
            }
        }
        Ok(())
    }

    /// Swap two positions and write both new indices back
    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.items.swap(a, b);
        self.items[a].set_queue_index(Some(a));
        self.items[b].set_queue_index(Some(b));
    }

    /// Move the item at `pos` toward the root. Returns `true` if it moved.
    fn sift_up(&mut self, mut pos: usize) -> bool {
        let start = pos;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.items[pos].comes_before(&self.items[parent]) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos != start
    }

    /// Move the item at `pos` toward the leaves, following the smaller child.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.items[right].comes_before(&self.items[left]) {
                right
            } else {
                left
            };

            if !self.items[child].comes_before(&self.items[pos]) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }
}

impl<T: QueueItem> Default for OrderedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Items outliving the store (shared handles) must not claim a position.
impl<T: QueueItem> Drop for OrderedStore<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: QueueItem> std::fmt::Debug for OrderedStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedStore")
            .field("len", &self.items.len())
            .field("capacity", &self.items.capacity())
            .finish()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "debug-assertions")] {
        #[inline]
        fn debug_verify<T: QueueItem>(store: &OrderedStore<T>) {
            if let Err(violation) = store.verify() {
                panic!("ordered store corrupted: {}", violation);
            }
        }
    } else {
        #[inline(always)]
        fn debug_verify<T: QueueItem>(_store: &OrderedStore<T>) {}
    }
}
