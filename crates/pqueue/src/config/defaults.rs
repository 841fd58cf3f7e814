//! Library defaults for `QueueConfig`
//!
//! Overridden at runtime by the `PQ_*` environment variables.

/// Maximum number of queued items; 0 means unbounded
pub const LIMIT: usize = 0;

/// Slots pre-allocated in the ordered store
pub const INITIAL_CAPACITY: usize = 64;

/// Wait slice for cancellable dequeue, in milliseconds
pub const CANCEL_POLL_MS: u64 = 10;

/// Raise the kprint level to debug when a queue is built from config
pub const DEBUG_LOGGING: bool = false;
