// benches/perf_spin.rs
//! Isolated contended read/write harness for tandem_spin - for perf profiling
//!
//! Run: cargo build --release --bench perf_spin
//! Profile: sudo perf stat -e cycles,instructions,cache-misses ./target/release/deps/perf_spin-*

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tandem_spin::SpinValue;

const WRITES: u64 = 1_000_000;

/// Monotonic snapshot; every lane carries the sequence so a torn install
/// would be caught immediately.
#[derive(Clone)]
struct Snapshot {
    sequence: u64,
    lanes: [u64; 15],
}

impl Snapshot {
    fn new(sequence: u64) -> Self {
        Self {
            sequence,
            lanes: [sequence; 15],
        }
    }
}

fn main() {
    let shared = Arc::new(SpinValue::new(Snapshot::new(0)));
    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let shared = Arc::clone(&shared);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut reads = 0u64;
            let mut last_seq = 0u64;

            while !stop.load(Ordering::Relaxed) {
                {
                    let snap = shared.lock_for_read();
                    assert!(snap.sequence >= last_seq, "sequence must be monotonic");
                    assert!(
                        snap.lanes.iter().all(|&v| v == snap.sequence),
                        "torn install"
                    );
                    last_seq = snap.sequence;
                    reads += 1;
                }
                thread::yield_now();
            }
            (last_seq, reads)
        })
    };

    let start = Instant::now();
    for i in 1..=WRITES {
        shared.write(Snapshot::new(i));
    }
    let elapsed = start.elapsed();

    stop.store(true, Ordering::Relaxed);
    let (last_seq, reads) = reader.join().unwrap();

    assert!(last_seq <= WRITES);
    println!("Total writes: {WRITES} in {elapsed:?}");
    println!(
        "Write latency: {:.1} ns avg (against {} overlapping reads)",
        elapsed.as_nanos() as f64 / WRITES as f64,
        reads
    );
}
