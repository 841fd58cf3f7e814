//! Item capability for the ordered store
//!
//! Anything stored in a queue must be able to order itself against other
//! items and remember where the store currently keeps it. The store writes
//! the position back on every structural move, which is what makes
//! arbitrary removal O(log n).
//!
//! Items are usually shared: the caller enqueues one `Arc` clone and keeps
//! another to call `remove` with later. For that reason the index is written
//! through `&self`, and `QueueSlot` provides the interior mutability.

use core::fmt;
use core::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

/// Capability set required from anything stored in an `OrderedStore`.
///
/// # Contract
///
/// - `comes_before` must be a strict weak ordering and must not change while
///   the item is stored. A contradictory predicate breaks heap order.
/// - `queue_index` must return exactly what the last `set_queue_index` call
///   stored. Callers must never write the index themselves.
///
/// Items that compare equal (neither comes before the other) are returned
/// in an unspecified order. There is no FIFO guarantee among equals.
///
/// # Example
///
/// ```
/// use pqueue_core::{QueueItem, QueueSlot};
///
/// struct Job {
///     deadline: u64,
///     slot: QueueSlot,
/// }
///
/// impl QueueItem for Job {
///     fn comes_before(&self, other: &Self) -> bool {
///         self.deadline < other.deadline
///     }
///     fn queue_index(&self) -> Option<usize> {
///         self.slot.get()
///     }
///     fn set_queue_index(&self, index: Option<usize>) {
///         self.slot.set(index);
///     }
/// }
/// ```
pub trait QueueItem {
    /// Returns `true` if `self` must be dequeued before `other`.
    fn comes_before(&self, other: &Self) -> bool;

    /// Current position in the store, or `None` if not stored.
    fn queue_index(&self) -> Option<usize>;

    /// Called by the store on every move. `None` means removed.
    fn set_queue_index(&self, index: Option<usize>);

    /// Identity test used to validate `remove` requests.
    ///
    /// The default compares addresses, so a by-value item can only match
    /// itself. Shared handles override this (see the `Arc` impl).
    #[inline]
    fn same_item(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }

    /// Returns `true` if the item is currently held by a store.
    #[inline]
    fn is_queued(&self) -> bool {
        self.queue_index().is_some()
    }
}

impl<T: QueueItem> QueueItem for Arc<T> {
    #[inline]
    fn comes_before(&self, other: &Self) -> bool {
        (**self).comes_before(&**other)
    }

    #[inline]
    fn queue_index(&self) -> Option<usize> {
        (**self).queue_index()
    }

    #[inline]
    fn set_queue_index(&self, index: Option<usize>) {
        (**self).set_queue_index(index)
    }

    #[inline]
    fn same_item(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// Sentinel stored in a `QueueSlot` when the item is not in a store.
const SLOT_NONE: isize = -1;

/// Atomic store position, embedded in item types.
///
/// Holds `-1` while the item is outside any store. Only the store writes
/// it; loads and stores are relaxed because every write happens under the
/// owning queue's lock.
pub struct QueueSlot {
    index: AtomicIsize,
}

impl QueueSlot {
    /// Create an empty slot (not stored)
    pub const fn new() -> Self {
        Self {
            index: AtomicIsize::new(SLOT_NONE),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<usize> {
        let raw = self.index.load(Ordering::Relaxed);
        if raw < 0 {
            None
        } else {
            Some(raw as usize)
        }
    }

    #[inline]
    pub fn set(&self, index: Option<usize>) {
        let raw = match index {
            Some(i) => i as isize,
            None => SLOT_NONE,
        };
        self.index.store(raw, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_queued(&self) -> bool {
        self.get().is_some()
    }
}

impl Default for QueueSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone is a new item and starts outside any store.
impl Clone for QueueSlot {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(i) => write!(f, "QueueSlot({})", i),
            None => write!(f, "QueueSlot(none)"),
        }
    }
}

/// Ready-made item: a priority plus a payload.
///
/// Lower priorities are dequeued first.
///
/// ```
/// use pqueue_core::{OrderedStore, Prioritized};
///
/// let mut store = OrderedStore::new();
/// store.push(Prioritized::new(3, "c"));
/// store.push(Prioritized::new(1, "a"));
/// assert_eq!(store.pop_min().map(|p| p.value), Some("a"));
/// ```
#[derive(Debug, Clone)]
pub struct Prioritized<P, V> {
    pub priority: P,
    pub value: V,
    slot: QueueSlot,
}

impl<P: Ord, V> Prioritized<P, V> {
    pub fn new(priority: P, value: V) -> Self {
        Self {
            priority,
            value,
            slot: QueueSlot::new(),
        }
    }

    /// Consume the item, returning `(priority, value)`
    pub fn into_parts(self) -> (P, V) {
        (self.priority, self.value)
    }
}

impl<P: Ord, V> QueueItem for Prioritized<P, V> {
    #[inline]
    fn comes_before(&self, other: &Self) -> bool {
        self.priority < other.priority
    }

    #[inline]
    fn queue_index(&self) -> Option<usize> {
        self.slot.get()
    }

    #[inline]
    fn set_queue_index(&self, index: Option<usize>) {
        self.slot.set(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_empty() {
        let slot = QueueSlot::new();
        assert_eq!(slot.get(), None);
        assert!(!slot.is_queued());
    }

    #[test]
    fn test_slot_set_and_clear() {
        let slot = QueueSlot::default();
        slot.set(Some(7));
        assert_eq!(slot.get(), Some(7));
        assert!(slot.is_queued());

        slot.set(None);
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_slot_clone_is_detached() {
        let slot = QueueSlot::new();
        slot.set(Some(3));
        let copy = slot.clone();
        assert_eq!(copy.get(), None);
        assert_eq!(slot.get(), Some(3));
    }

    #[test]
    fn test_slot_debug() {
        let slot = QueueSlot::new();
        assert_eq!(format!("{:?}", slot), "QueueSlot(none)");
        slot.set(Some(2));
        assert_eq!(format!("{:?}", slot), "QueueSlot(2)");
    }

    #[test]
    fn test_prioritized_ordering() {
        let a = Prioritized::new(1, "a");
        let b = Prioritized::new(2, "b");
        assert!(a.comes_before(&b));
        assert!(!b.comes_before(&a));

        // Equal priorities: neither comes first
        let c = Prioritized::new(1, "c");
        assert!(!a.comes_before(&c));
        assert!(!c.comes_before(&a));
    }

    #[test]
    fn test_same_item_by_address() {
        let a = Prioritized::new(1, ());
        let b = Prioritized::new(1, ());
        assert!(a.same_item(&a));
        assert!(!a.same_item(&b));
    }

    #[test]
    fn test_arc_shares_index_and_identity() {
        let a = Arc::new(Prioritized::new(5, "job"));
        let handle = Arc::clone(&a);
        let other = Arc::new(Prioritized::new(5, "job"));

        a.set_queue_index(Some(4));
        assert_eq!(handle.queue_index(), Some(4));
        assert!(handle.is_queued());

        assert!(a.same_item(&handle));
        assert!(!a.same_item(&other));
    }

    #[test]
    fn test_into_parts() {
        let p = Prioritized::new(9u8, String::from("x"));
        assert_eq!(p.into_parts(), (9, String::from("x")));
    }
}
