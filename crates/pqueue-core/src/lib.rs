//! # pqueue-core
//!
//! Core types for the pqueue concurrent priority queue.
//!
//! This crate holds everything that does not need a lock: the item
//! capability trait, the index-tracking binary heap, error types and the
//! small runtime helpers (logging, env parsing, cancellation) shared by the
//! `pqueue` crate.
//!
//! ## Modules
//!
//! - `item` - `QueueItem` trait, `QueueSlot` index cell, `Prioritized` item
//! - `store` - `OrderedStore`, array-backed min-heap with index write-back
//! - `error` - Error types
//! - `cancel` - Cancellation token for cooperative cancellation
//! - `kprint` - Kernel-style debug printing macros
//! - `env` - Environment variable utilities

pub mod item;
pub mod store;
pub mod error;
pub mod cancel;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use item::{Prioritized, QueueItem, QueueSlot};
pub use store::OrderedStore;
pub use error::{CapacityExceeded, QueueError, QueueResult, StoreViolation};
pub use cancel::CancellationToken;
pub use env::{env_get, env_get_bool, env_get_millis, env_get_opt, env_get_str, env_is_set};
