//! Multi-producer / multi-consumer behaviour of `Queue`

use pqueue::{CancellationToken, Prioritized, Queue, QueueError, QueueItem};
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const PRODUCERS: usize = 4;
const CONSUMERS: usize = 4;
const PER_PRODUCER: u64 = 50_000;
const SENTINEL: u64 = u64::MAX;

/// Item value: (producer id, sequence number)
type Job = Prioritized<u64, (usize, u64)>;

#[test]
fn no_item_lost_or_duplicated() {
    let queue: Arc<Queue<Job>> = Arc::new(Queue::new(0));

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    let job = queue.dequeue();
                    if job.priority == SENTINEL {
                        return seen;
                    }
                    seen.push(job.value);
                }
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for seq in 0..PER_PRODUCER {
                    let priority = rng.gen_range(0..1_000_000);
                    queue.enqueue(Prioritized::new(priority, (id, seq))).unwrap();
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }

    // Sentinels sort after every real item, so each consumer drains before stopping
    for _ in 0..CONSUMERS {
        queue.enqueue(Prioritized::new(SENTINEL, (usize::MAX, 0))).unwrap();
    }

    let mut all = HashSet::new();
    let mut total = 0usize;
    for c in consumers {
        let seen = c.join().unwrap();
        total += seen.len();
        all.extend(seen);
    }

    let expected = PRODUCERS * PER_PRODUCER as usize;
    assert_eq!(total, expected, "items lost or duplicated");
    assert_eq!(all.len(), expected, "duplicate deliveries");
    assert!(queue.is_empty());

    let stats = queue.stats();
    assert_eq!(stats.total_enqueued, (expected + CONSUMERS) as u64);
    assert_eq!(stats.total_dequeued, stats.total_enqueued);
    assert_eq!(stats.total_rejected, 0);
}

#[test]
fn single_consumer_sees_priority_order() {
    let queue = Queue::new(0);
    let mut rng = rand::thread_rng();
    for _ in 0..10_000 {
        let p: u32 = rng.gen();
        queue.enqueue(Prioritized::new(p, ())).unwrap();
    }

    let mut last = 0u32;
    while let Some(job) = queue.try_dequeue() {
        assert!(job.priority >= last);
        last = job.priority;
    }
}

#[test]
fn bounded_queue_never_exceeds_limit() {
    const LIMIT: usize = 64;
    let queue: Arc<Queue<Prioritized<u32, ()>>> = Arc::new(Queue::new(LIMIT));
    let accepted = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let accepted = Arc::clone(&accepted);
            thread::spawn(move || {
                for p in 0..1_000 {
                    if queue.enqueue(Prioritized::new(p, ())).is_ok() {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    }
                    assert!(queue.len() <= LIMIT);
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }

    let stats = queue.stats();
    assert_eq!(stats.len, LIMIT);
    assert_eq!(accepted.load(Ordering::Relaxed), LIMIT);
    assert_eq!(stats.total_rejected as usize, PRODUCERS * 1_000 - LIMIT);
}

#[test]
fn remove_races_with_dequeue() {
    let queue: Arc<Queue<Arc<Prioritized<u32, u32>>>> = Arc::new(Queue::new(0));
    let handles: Vec<_> = (0..2_000u32)
        .map(|i| Arc::new(Prioritized::new(i, i)))
        .collect();
    for h in &handles {
        queue.enqueue(Arc::clone(h)).unwrap();
    }

    let remover = {
        let queue = Arc::clone(&queue);
        let handles = handles.clone();
        thread::spawn(move || {
            let mut removed = 0usize;
            for h in handles.iter().rev() {
                match queue.remove(h) {
                    Ok(_) => removed += 1,
                    Err(QueueError::NotQueued) => {}
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
            removed
        })
    };

    let mut dequeued = 0usize;
    while queue.try_dequeue().is_some() {
        dequeued += 1;
    }

    let removed = remover.join().unwrap();
    while queue.try_dequeue().is_some() {
        dequeued += 1;
    }

    assert_eq!(removed + dequeued, handles.len());
    assert!(handles.iter().all(|h| !h.is_queued()));
}

#[test]
fn cancel_releases_all_waiters() {
    let queue: Arc<Queue<Prioritized<u32, ()>>> = Arc::new(Queue::new(0));
    let token = CancellationToken::new();

    let waiters: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let token = token.child();
            thread::spawn(move || queue.dequeue_cancellable(&token).map(|_| ()))
        })
        .collect();

    thread::sleep(Duration::from_millis(30));
    token.cancel();

    for w in waiters {
        assert_eq!(w.join().unwrap(), Err(QueueError::Cancelled));
    }
    assert_eq!(queue.stats().waiting, 0);
}
