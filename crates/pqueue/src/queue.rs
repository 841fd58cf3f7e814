//! Concurrent bounded priority queue
//!
//! One `Mutex` guards the ordered store and the limit; one `Condvar` tied
//! to that mutex parks consumers while the store is empty.
//!
//! ```text
//!  producers                                          consumers
//!  ─────────                                          ─────────
//!  enqueue ──► lock ─► limit check ─► push ─► notify_one ─┐
//!                                                         ▼
//!  dequeue ◄── unlock ◄─ pop_min ◄─ (empty? wait, recheck) ◄── lock
//! ```
//!
//! Every wait sits in a loop that rechecks the store after waking, so a
//! wakeup lost to another consumer, or a spurious one, just parks again.
//! `enqueue` never blocks; a full bounded queue rejects the item.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use pqueue_core::{
    CancellationToken, CapacityExceeded, OrderedStore, QueueError, QueueItem, QueueResult,
};
use pqueue_core::{kdebug, ktrace, kwarn};
use pqueue_core::kprint::{set_log_level, LogLevel};

use crate::config::QueueConfig;

/// State protected by the queue mutex
struct QueueInner<T: QueueItem> {
    /// Heap of queued items
    store: OrderedStore<T>,

    /// Maximum item count, 0 = unbounded
    limit: usize,

    /// Consumers currently parked on the condvar
    waiting: usize,

    /// Stats: successful enqueues
    total_enqueued: u64,

    /// Stats: items handed to consumers
    total_dequeued: u64,

    /// Stats: enqueues rejected by the limit
    total_rejected: u64,

    /// Stats: items taken out by `remove`
    total_removed: u64,
}

impl<T: QueueItem> QueueInner<T> {
    fn is_full(&self) -> bool {
        self.limit > 0 && self.store.len() >= self.limit
    }

    fn take_min(&mut self) -> Option<T> {
        let item = self.store.pop_min()?;
        self.total_dequeued += 1;
        Some(item)
    }
}

/// Thread-safe priority queue exchange.
///
/// Share it between threads with an `Arc`. Items leave in
/// `QueueItem::comes_before` order; items that compare equal leave in
/// unspecified order, and which parked consumer wakes first is also
/// unspecified.
///
/// # Example
///
/// ```
/// use pqueue::{Prioritized, Queue};
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue: Arc<Queue<Prioritized<i32, &str>>> = Arc::new(Queue::new(0));
///
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.dequeue().value)
/// };
///
/// queue.enqueue(Prioritized::new(1, "task")).unwrap();
/// assert_eq!(consumer.join().unwrap(), "task");
/// ```
pub struct Queue<T: QueueItem> {
    inner: Mutex<QueueInner<T>>,

    /// Signalled once per successful enqueue
    available: Condvar,

    /// Size mirror for lock-free reads, written under the lock
    len_hint: AtomicUsize,

    /// Wait slice for `dequeue_cancellable`
    cancel_poll_interval: Duration,
}

impl<T: QueueItem> Queue<T> {
    /// Create a queue holding at most `limit` items; 0 means unbounded.
    pub fn new(limit: usize) -> Self {
        Self::with_config(QueueConfig::new().limit(limit))
    }

    /// Create a queue from a configuration.
    ///
    /// An invalid `cancel_poll_interval` is replaced by the library default.
    /// `debug_logging` raises the process-wide kprint level to debug unless
    /// `PQ_LOG_LEVEL` is set; see `QueueConfig::raises_log_level`.
    pub fn with_config(mut config: QueueConfig) -> Self {
        if let Err(e) = config.validate() {
            kwarn!("pqueue: {}, using defaults", e);
            config.cancel_poll_interval = QueueConfig::new().cancel_poll_interval;
        }
        if config.raises_log_level() {
            set_log_level(LogLevel::Debug);
        }

        Self {
            inner: Mutex::new(QueueInner {
                store: OrderedStore::with_capacity(config.effective_capacity()),
                limit: config.limit,
                waiting: 0,
                total_enqueued: 0,
                total_dequeued: 0,
                total_rejected: 0,
                total_removed: 0,
            }),
            available: Condvar::new(),
            len_hint: AtomicUsize::new(0),
            cancel_poll_interval: config.cancel_poll_interval,
        }
    }

    /// Insert an item.
    ///
    /// Never blocks. If the queue is bounded and full, the item is handed
    /// back in `CapacityExceeded` and the queue is left untouched; retrying
    /// or dropping it is up to the caller.
    pub fn enqueue(&self, item: T) -> Result<(), CapacityExceeded<T>> {
        let mut inner = self.lock();
        if inner.is_full() {
            inner.total_rejected += 1;
            let limit = inner.limit;
            drop(inner);
            kdebug!("pqueue: enqueue rejected, limit {} reached", limit);
            return Err(CapacityExceeded(item));
        }

        // Counted first: a panicking `comes_before` leaves the item stored
        inner.total_enqueued += 1;
        self.len_hint.store(inner.store.len() + 1, Ordering::Relaxed);
        inner.store.push(item);

        if inner.waiting > 0 {
            self.available.notify_one();
        }
        Ok(())
    }

    /// Take the minimum item, blocking while the queue is empty.
    ///
    /// Blocks indefinitely if nothing is ever enqueued. See
    /// `dequeue_timeout` and `dequeue_cancellable` for bounded waits.
    pub fn dequeue(&self) -> T {
        let mut inner = self.lock();
        loop {
            if let Some(item) = inner.take_min() {
                self.publish_len(&inner);
                return item;
            }

            inner.waiting += 1;
            inner = self
                .available
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
            inner.waiting -= 1;
        }
    }

    /// Take the minimum item without blocking.
    pub fn try_dequeue(&self) -> Option<T> {
        let mut inner = self.lock();
        let item = inner.take_min()?;
        self.publish_len(&inner);
        Some(item)
    }

    /// Take the minimum item, waiting at most `timeout` for one to arrive.
    ///
    /// Returns `Err(Timeout)` if the queue stayed empty. A timeout too large
    /// to represent as a deadline waits like `dequeue`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> QueueResult<T> {
        let deadline = Instant::now().checked_add(timeout);
        let mut inner = self.lock();
        loop {
            if let Some(item) = inner.take_min() {
                self.publish_len(&inner);
                return Ok(item);
            }

            inner.waiting += 1;
            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        inner.waiting -= 1;
                        ktrace!("pqueue: dequeue timed out after {:?}", timeout);
                        return Err(QueueError::Timeout);
                    }
                    let (guard, _) = self
                        .available
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    inner = guard;
                }
                None => {
                    inner = self
                        .available
                        .wait(inner)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
            inner.waiting -= 1;
        }
    }

    /// Take the minimum item, giving up once `token` is cancelled.
    ///
    /// The token is checked before waiting and after every wait slice
    /// (`QueueConfig::cancel_poll_interval`). An item that is already
    /// available is still taken; cancellation only ends the waiting.
    pub fn dequeue_cancellable(&self, token: &CancellationToken) -> QueueResult<T> {
        let mut inner = self.lock();
        loop {
            if let Some(item) = inner.take_min() {
                self.publish_len(&inner);
                return Ok(item);
            }

            if token.is_cancelled() {
                ktrace!("pqueue: dequeue cancelled");
                return Err(QueueError::Cancelled);
            }

            inner.waiting += 1;
            let (guard, _) = self
                .available
                .wait_timeout(inner, self.cancel_poll_interval)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
            inner.waiting -= 1;
        }
    }

    /// Clone of the minimum item, if any.
    pub fn peek_front(&self) -> Option<T>
    where
        T: Clone,
    {
        self.peek_front_with(T::clone)
    }

    /// Clone of the item in the last heap slot, if any.
    ///
    /// This is a leaf of the heap, not necessarily the maximum.
    pub fn peek_back(&self) -> Option<T>
    where
        T: Clone,
    {
        self.peek_back_with(T::clone)
    }

    /// Apply `f` to the minimum item under the lock.
    pub fn peek_front_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let inner = self.lock();
        inner.store.peek_front().map(f)
    }

    /// Apply `f` to the item in the last heap slot under the lock.
    pub fn peek_back_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let inner = self.lock();
        inner.store.peek_back().map(f)
    }

    /// Remove a specific item from the queue. O(log n).
    ///
    /// `item` is a handle to something previously enqueued here, typically
    /// another clone of the same `Arc`. Returns the stored item.
    ///
    /// Returns `Err(NotQueued)` when the item is not in this queue: already
    /// dequeued or removed, never enqueued, or held by a different queue.
    pub fn remove(&self, item: &T) -> QueueResult<T> {
        let mut inner = self.lock();

        let index = item.queue_index().ok_or(QueueError::NotQueued)?;
        match inner.store.get(index) {
            Some(occupant) if occupant.same_item(item) => {}
            _ => return Err(QueueError::NotQueued),
        }

        let removed = inner.store.remove_at(index).ok_or(QueueError::NotQueued)?;
        inner.total_removed += 1;
        self.publish_len(&inner);
        Ok(removed)
    }

    /// Change the item limit; 0 makes the queue unbounded.
    ///
    /// Only future enqueues are affected. Lowering the limit below the
    /// current size evicts nothing; the queue stays over the limit until
    /// enough items are dequeued.
    pub fn change_limit(&self, new_limit: usize) {
        let mut inner = self.lock();
        let old = inner.limit;
        inner.limit = new_limit;
        let len = inner.store.len();
        drop(inner);

        kdebug!("pqueue: limit changed {} -> {} (len {})", old, new_limit, len);
    }

    /// Current item limit (0 = unbounded)
    pub fn limit(&self) -> usize {
        self.lock().limit
    }

    /// Number of queued items, read under the lock.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    /// `len() == 0`
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued items without taking the lock.
    ///
    /// Reflects the last completed operation; may be stale by the time the
    /// caller looks at it. Good for emptiness hints and metrics only.
    pub fn approx_len(&self) -> usize {
        self.len_hint.load(Ordering::Relaxed)
    }

    /// Wake every parked consumer.
    ///
    /// Each one rechecks the queue and parks again if it is still empty.
    /// Cancellable consumers also recheck their token, so this shortens
    /// shutdown after cancelling.
    pub fn notify_all(&self) {
        let _inner = self.lock();
        self.available.notify_all();
    }

    /// Get statistics snapshot
    pub fn stats(&self) -> QueueStats {
        let inner = self.lock();
        QueueStats {
            len: inner.store.len(),
            limit: inner.limit,
            waiting: inner.waiting,
            total_enqueued: inner.total_enqueued,
            total_dequeued: inner.total_dequeued,
            total_rejected: inner.total_rejected,
            total_removed: inner.total_removed,
        }
    }

    /// Lock the state, recovering from poisoning.
    ///
    /// A panic in a user `comes_before` can poison the mutex mid-sift. The
    /// size mirror is resynchronized from the store on recovery.
    fn lock(&self) -> MutexGuard<'_, QueueInner<T>> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => {
                let inner = poisoned.into_inner();
                self.publish_len(&inner);
                inner
            }
        }
    }

    #[inline]
    fn publish_len(&self, inner: &QueueInner<T>) {
        self.len_hint.store(inner.store.len(), Ordering::Relaxed);
    }
}

impl<T: QueueItem> Default for Queue<T> {
    /// Queue configured from `PQ_*` environment variables
    fn default() -> Self {
        Self::with_config(QueueConfig::from_env())
    }
}

impl<T: QueueItem> std::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Ok(inner) => f
                .debug_struct("Queue")
                .field("len", &inner.store.len())
                .field("limit", &inner.limit)
                .field("waiting", &inner.waiting)
                .finish(),
            Err(_) => f
                .debug_struct("Queue")
                .field("len", &self.approx_len())
                .field("limit", &"<locked>")
                .finish(),
        }
    }
}

/// Statistics for Queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Items currently queued
    pub len: usize,
    /// Current limit (0 = unbounded)
    pub limit: usize,
    /// Consumers parked waiting for an item
    pub waiting: usize,
    /// Successful enqueues (lifetime)
    pub total_enqueued: u64,
    /// Items returned by any dequeue variant (lifetime)
    pub total_dequeued: u64,
    /// Enqueues rejected by the limit (lifetime)
    pub total_rejected: u64,
    /// Items taken out by `remove` (lifetime)
    pub total_removed: u64,
}
