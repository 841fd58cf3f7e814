//! Basic pqueue example
//!
//! One producer, two workers, a bounded queue and a withdrawn job.
//!
//! # Environment Variables
//!
//! - `PQ_FLUSH_EPRINT=1` - Flush debug output immediately
//! - `PQ_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)
//! - `PQ_LIMIT=<n>` - Override the queue limit

use pqueue::{kdebug, kinfo, CancellationToken, Prioritized, Queue, QueueConfig, QueueError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type Job = Arc<Prioritized<u32, &'static str>>;

// PQ_LOG_LEVEL=debug PQ_FLUSH_EPRINT=1 cargo run -p pqueue-basic
fn main() {
    println!("=== pqueue Basic Example ===\n");

    let config = QueueConfig::from_env().limit(8).debug_logging(true);
    config.print();
    let queue: Arc<Queue<Job>> = Arc::new(Queue::with_config(config));

    let jobs = [
        (5, "rebuild index"),
        (1, "page oncall"),
        (3, "send digest"),
        (2, "rotate logs"),
        (4, "compact store"),
    ];
    let handles: Vec<Job> = jobs
        .iter()
        .map(|&(p, name)| Arc::new(Prioritized::new(p, name)))
        .collect();

    for job in &handles {
        if let Err(e) = queue.enqueue(Arc::clone(job)) {
            let reason = e.to_string();
            println!("Rejected '{}': {}", e.into_inner().value, reason);
        }
    }
    println!("Queued {} jobs, front = {:?}", queue.len(),
        queue.peek_front_with(|j| j.value));

    // Withdraw one before any worker sees it
    match queue.remove(&handles[2]) {
        Ok(job) => println!("Withdrew '{}'", job.value),
        Err(e) => println!("Withdraw failed: {}", e),
    }

    let done = Arc::new(AtomicUsize::new(0));
    let token = CancellationToken::new();

    let workers: Vec<_> = (0..2)
        .map(|id| {
            let queue = Arc::clone(&queue);
            let done = Arc::clone(&done);
            let token = token.child();
            thread::spawn(move || loop {
                match queue.dequeue_cancellable(&token) {
                    Ok(job) => {
                        kdebug!("[worker {}] running '{}' (priority {})", id, job.value, job.priority);
                        println!("worker {} ran '{}'", id, job.value);
                        done.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(QueueError::Cancelled) => {
                        kdebug!("[worker {}] stopping", id);
                        return;
                    }
                    Err(e) => {
                        println!("worker {} error: {}", id, e);
                        return;
                    }
                }
            })
        })
        .collect();

    // Wait for the backlog to drain
    let start = std::time::Instant::now();
    while !queue.is_empty() {
        if start.elapsed() > Duration::from_secs(10) {
            println!("WARNING: Timeout!");
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    token.cancel();
    queue.notify_all();
    for w in workers {
        let _ = w.join();
    }

    kinfo!("{} job(s) completed", done.load(Ordering::SeqCst));
    println!("\nStats: {:?}", queue.stats());
    println!("\n=== Example Complete ===");
}
