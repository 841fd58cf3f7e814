//! Cancellation token for cooperative cancellation
//!
//! Consumers blocked in `Queue::dequeue_cancellable` poll a token between
//! wait slices and give up with `QueueError::Cancelled` once it fires.
//! Tokens can be linked to form parent-child relationships, so one
//! shutdown token can stop a whole pool of consumers.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::error::{QueueError, QueueResult};

/// Token for checking and triggering cancellation
///
/// Clones share state: cancelling any clone cancels all of them.
#[derive(Clone)]
pub struct CancellationToken {
    inner: CancellationInner,
}

#[derive(Clone)]
enum CancellationInner {
    /// Shared flag, optionally chained to a parent
    Owned(Arc<OwnedCancellation>),
    /// Token that never cancels
    Never,
}

struct OwnedCancellation {
    /// Cancellation flag
    cancelled: AtomicBool,

    /// Parent token (if any)
    parent: Option<CancellationToken>,
}

impl CancellationToken {
    /// Create a new independent cancellation token
    pub fn new() -> Self {
        Self {
            inner: CancellationInner::Owned(Arc::new(OwnedCancellation {
                cancelled: AtomicBool::new(false),
                parent: None,
            })),
        }
    }

    /// Create a token that never cancels (no allocation)
    pub fn never() -> Self {
        Self {
            inner: CancellationInner::Never,
        }
    }

    /// Create a child token linked to this one
    ///
    /// If this token is cancelled, checking the child will also return cancelled.
    pub fn child(&self) -> Self {
        Self {
            inner: CancellationInner::Owned(Arc::new(OwnedCancellation {
                cancelled: AtomicBool::new(false),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Check if cancellation was requested
    ///
    /// Also checks parent tokens recursively.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        match &self.inner {
            CancellationInner::Owned(arc) => {
                if arc.cancelled.load(Ordering::Acquire) {
                    return true;
                }
                match arc.parent {
                    Some(ref parent) => parent.is_cancelled(),
                    None => false,
                }
            }
            CancellationInner::Never => false,
        }
    }

    /// Request cancellation
    ///
    /// This only sets this token's flag, not parent's.
    pub fn cancel(&self) {
        if let CancellationInner::Owned(arc) = &self.inner {
            arc.cancelled.store(true, Ordering::Release);
        }
    }

    /// Return `Err(Cancelled)` if cancellation was requested
    ///
    /// ```ignore
    /// fn worker(queue: &Queue<Job>, token: &CancellationToken) -> QueueResult<()> {
    ///     loop {
    ///         token.check()?;
    ///         let job = queue.dequeue_cancellable(token)?;
    ///         job.run();
    ///     }
    /// }
    /// ```
    #[inline]
    pub fn check(&self) -> QueueResult<()> {
        if self.is_cancelled() {
            Err(QueueError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reset cancellation (for token reuse)
    ///
    /// Warning: This does not affect child tokens or parent tokens.
    pub fn reset(&self) {
        if let CancellationInner::Owned(arc) = &self.inner {
            arc.cancelled.store(false, Ordering::Release);
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
