//! # pqueue
//!
//! A concurrent, bounded, priority-ordered work queue.
//!
//! Producers `enqueue` items from any thread; consumers `dequeue` the item
//! that comes first, blocking while the queue is empty. A bounded queue
//! rejects work when full instead of blocking the producer, and any queued
//! item can be withdrawn in O(log n) through the position it carries.
//!
//! ## Quick Start
//!
//! ```rust
//! use pqueue::{Prioritized, Queue};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue: Arc<Queue<Prioritized<i32, &str>>> = Arc::new(Queue::new(100));
//!
//! let worker = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         let mut done = Vec::new();
//!         for _ in 0..3 {
//!             done.push(queue.dequeue().value);
//!         }
//!         done
//!     })
//! };
//!
//! queue.enqueue(Prioritized::new(1, "a")).unwrap();
//! queue.enqueue(Prioritized::new(2, "b")).unwrap();
//! queue.enqueue(Prioritized::new(3, "c")).unwrap();
//!
//! assert_eq!(worker.join().unwrap().len(), 3);
//! ```
//!
//! ## Items
//!
//! Anything implementing [`QueueItem`] can be queued. The queue writes each
//! item's heap position back through `set_queue_index`, which is what makes
//! [`Queue::remove`] cheap. [`QueueSlot`] is a ready-made cell for that
//! position, and [`Prioritized`] wraps a value with an `Ord` priority.
//! Queue `Arc<T>` to keep a handle for later removal.
//!
//! ## Configuration
//!
//! [`config::QueueConfig`] reads `PQ_*` environment variables; see the
//! `config` module. Logging goes to stderr through the `k*` macros and is
//! controlled by `PQ_LOG_LEVEL`.

pub mod config;
mod queue;

pub use queue::{Queue, QueueStats};
pub use config::{ConfigError, QueueConfig};

// Re-export core types
pub use pqueue_core::{
    CancellationToken, CapacityExceeded, OrderedStore, Prioritized, QueueError, QueueItem,
    QueueResult, QueueSlot, StoreViolation,
};

// Re-export logging
pub use pqueue_core::{kdebug, kerror, kinfo, kprint, kprintln, ktrace, kwarn};
pub use pqueue_core::kprint::{init as init_logging, set_flush_enabled, set_log_level, LogLevel};

// Re-export env helpers
pub use pqueue_core::env::{
    env_get, env_get_bool, env_get_millis, env_get_opt, env_get_str, env_is_set,
};
