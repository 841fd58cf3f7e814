//! Error types for pqueue

use core::fmt;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur in queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Bounded queue is full; the item was not inserted
    CapacityExceeded,

    /// Item passed to `remove` is not stored in this queue
    NotQueued,

    /// Timed dequeue expired with the queue still empty
    Timeout,

    /// Operation was cancelled via CancellationToken
    Cancelled,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::CapacityExceeded => write!(f, "queue limit reached"),
            QueueError::NotQueued => write!(f, "item not in queue"),
            QueueError::Timeout => write!(f, "operation timed out"),
            QueueError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Error returned by `enqueue` on a full queue.
///
/// Hands the rejected item back to the caller; the queue never retries.
#[derive(Clone, PartialEq, Eq)]
pub struct CapacityExceeded<T>(pub T);

impl<T> CapacityExceeded<T> {
    /// Recover the rejected item
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for CapacityExceeded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapacityExceeded(..)")
    }
}

impl<T> fmt::Display for CapacityExceeded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue limit reached")
    }
}

impl<T> std::error::Error for CapacityExceeded<T> {}

impl<T> From<CapacityExceeded<T>> for QueueError {
    fn from(_: CapacityExceeded<T>) -> Self {
        QueueError::CapacityExceeded
    }
}

/// Broken store invariant, reported by `OrderedStore::verify`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreViolation {
    /// Child comes before its parent
    HeapOrder { parent: usize, child: usize },

    /// Item's recorded index differs from its actual position
    IndexMismatch {
        position: usize,
        recorded: Option<usize>,
    },
}

impl fmt::Display for StoreViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreViolation::HeapOrder { parent, child } => {
                write!(f, "heap order violated: position {} comes before parent {}", child, parent)
            }
            StoreViolation::IndexMismatch { position, recorded: Some(r) } => {
                write!(f, "item at position {} records index {}", position, r)
            }
            StoreViolation::IndexMismatch { position, recorded: None } => {
                write!(f, "item at position {} records no index", position)
            }
        }
    }
}

impl std::error::Error for StoreViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", QueueError::CapacityExceeded), "queue limit reached");
        assert_eq!(format!("{}", QueueError::NotQueued), "item not in queue");
        assert_eq!(format!("{}", QueueError::Timeout), "operation timed out");
        assert_eq!(format!("{}", QueueError::Cancelled), "operation cancelled");
    }

    #[test]
    fn test_capacity_exceeded_returns_item() {
        let err = CapacityExceeded(String::from("job"));
        assert_eq!(format!("{}", err), "queue limit reached");
        assert_eq!(err.into_inner(), "job");
    }

    #[test]
    fn test_capacity_exceeded_conversion() {
        fn push_all() -> QueueResult<()> {
            let rejected: Result<(), CapacityExceeded<u8>> = Err(CapacityExceeded(42));
            rejected?;
            Ok(())
        }
        assert_eq!(push_all(), Err(QueueError::CapacityExceeded));
    }

    #[test]
    fn test_violation_display() {
        let v = StoreViolation::HeapOrder { parent: 0, child: 2 };
        assert_eq!(format!("{}", v), "heap order violated: position 2 comes before parent 0");

        let v = StoreViolation::IndexMismatch { position: 3, recorded: None };
        assert_eq!(format!("{}", v), "item at position 3 records no index");
    }
}
