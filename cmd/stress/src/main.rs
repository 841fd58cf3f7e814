//! Stress test - many producers and consumers on one queue
//!
//! Usage: stress [producers] [consumers] [items_per_producer] [limit]
//!
//! Producers retry on a full queue; consumers stop on a sentinel that sorts
//! after every real item. Verifies that every item is delivered exactly once.

use pqueue::{kinfo, kwarn, Prioritized, Queue, QueueConfig};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SENTINEL: u64 = u64::MAX;

fn arg(n: usize, default: usize) -> usize {
    std::env::args()
        .nth(n)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Sum of `0..n`, wrapping like the `fetch_add` that builds the checksum
fn wrapping_triangle(n: u64) -> u64 {
    if n % 2 == 0 {
        (n / 2).wrapping_mul(n.saturating_sub(1))
    } else {
        n.wrapping_mul((n - 1) / 2)
    }
}

fn main() {
    println!("=== pqueue Stress Test ===\n");

    let producers = arg(1, 4).max(1);
    let consumers = arg(2, 4).max(1);
    let per_producer = arg(3, 250_000) as u64;
    let limit = arg(4, 0);
    let total = match (producers as u64).checked_mul(per_producer) {
        Some(total) => total,
        None => {
            println!("producers x items_per_producer overflows u64");
            std::process::exit(2);
        }
    };

    println!(
        "{} producers x {} items, {} consumers, limit {}",
        producers, per_producer, consumers,
        if limit == 0 { "unbounded".to_string() } else { limit.to_string() }
    );

    let queue: Arc<Queue<Prioritized<u64, u64>>> =
        Arc::new(Queue::with_config(QueueConfig::from_env().limit(limit)));
    let consumed = Arc::new(AtomicU64::new(0));
    let checksum = Arc::new(AtomicU64::new(0));
    let retries = Arc::new(AtomicU64::new(0));

    let start = Instant::now();

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let consumed = Arc::clone(&consumed);
            let checksum = Arc::clone(&checksum);
            thread::spawn(move || loop {
                let item = queue.dequeue();
                if item.priority == SENTINEL {
                    return;
                }
                consumed.fetch_add(1, Ordering::Relaxed);
                checksum.fetch_add(item.value, Ordering::Relaxed);
            })
        })
        .collect();

    let producer_handles: Vec<_> = (0..producers)
        .map(|id| {
            let queue = Arc::clone(&queue);
            let retries = Arc::clone(&retries);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for seq in 0..per_producer {
                    let value = id as u64 * per_producer + seq;
                    let mut item = Prioritized::new(rng.gen_range(0..1_000_000), value);
                    loop {
                        match queue.enqueue(item) {
                            Ok(()) => break,
                            Err(rejected) => {
                                retries.fetch_add(1, Ordering::Relaxed);
                                item = rejected.into_inner();
                                thread::yield_now();
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for (i, p) in producer_handles.into_iter().enumerate() {
        if p.join().is_err() {
            kwarn!("producer {} panicked", i);
        }
    }
    let produce_time = start.elapsed();
    kinfo!("producers done in {:?}", produce_time);

    // Sentinels may be rejected by a full bounded queue too
    for _ in 0..consumers {
        let mut item = Prioritized::new(SENTINEL, 0);
        while let Err(rejected) = queue.enqueue(item) {
            item = rejected.into_inner();
            thread::sleep(Duration::from_millis(1));
        }
    }

    for (i, c) in consumer_handles.into_iter().enumerate() {
        if c.join().is_err() {
            kwarn!("consumer {} panicked", i);
        }
    }
    let total_time = start.elapsed();

    let got = consumed.load(Ordering::Relaxed);
    let expected_sum = wrapping_triangle(total);
    let sum = checksum.load(Ordering::Relaxed);

    println!("\n=== Results ===");
    println!("Produced:        {}", total);
    println!("Consumed:        {}", got);
    println!("Checksum:        {}", if sum == expected_sum { "ok" } else { "MISMATCH" });
    println!("Full retries:    {}", retries.load(Ordering::Relaxed));
    println!("Produce time:    {:?}", produce_time);
    println!("Total time:      {:?}", total_time);
    println!("Throughput:      {:.0} items/sec", got as f64 / total_time.as_secs_f64());
    println!("Stats:           {:?}", queue.stats());

    if got != total || sum != expected_sum {
        println!("\n=== Stress Test FAILED ===");
        std::process::exit(1);
    }
    println!("\n=== Stress Test Complete ===");
}
