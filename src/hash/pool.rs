// Bounded worker pool shared by batch hashing and batch validation
//
// All work items are loaded into a queue up front, a fixed number of scoped
// worker threads drain it, and each finished item is pushed onto a results
// channel. The scope join is the barrier: results are drained only after
// every worker has exited.

use std::thread;

use crossbeam_channel::unbounded;
use tracing::debug;

/// Resolve a requested worker count: 0 means one per available CPU
pub fn normalize_workers(workers: usize) -> usize {
    if workers == 0 { num_cpus::get().max(1) } else { workers }
}

/// Run `work` over every item on a pool of `workers` threads
///
/// Returns exactly one output per item, in completion order. `on_done` is
/// invoked from the worker thread after each item finishes.
pub fn run<T, R, W, P>(items: Vec<T>, workers: usize, work: W, on_done: P) -> Vec<R>
where
    T: Send,
    R: Send,
    W: Fn(T) -> R + Sync,
    P: Fn(&R) + Sync,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = normalize_workers(workers).min(total);

    let (queue_tx, queue_rx) = unbounded::<T>();
    for item in items {
        // The receiver is alive in this scope, so the send cannot fail
        let _ = queue_tx.send(item);
    }
    drop(queue_tx);

    let (result_tx, result_rx) = unbounded::<R>();
    debug!(workers, items = total, "starting worker pool");

    thread::scope(|scope| {
        for _ in 0..workers {
            let queue_rx = queue_rx.clone();
            let result_tx = result_tx.clone();
            let work = &work;
            let on_done = &on_done;
            scope.spawn(move || {
                for item in queue_rx.iter() {
                    let result = work(item);
                    on_done(&result);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    result_rx.into_iter().collect()
}
