//! Fire-and-forget monitor dispatch on a fixed-size worker pool.
//!
//! Committing code hands a message plus a snapshot of monitors to
//! [`DispatchPool::submit`], which only enqueues. Worker threads pick up
//! notifications and run the monitors in snapshot order.
//!
//! ## Guarantees
//!
//! - `submit` never blocks on monitor execution (the queue is unbounded, the
//!   worker count is fixed)
//! - A panicking monitor is logged and counted; the remaining monitors for the
//!   same message still run
//! - No ordering across messages: two notifications may run on different
//!   workers concurrently
//! - No cancellation or timeout; queued notifications are drained on shutdown

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::monitor::Monitor;

/// Dispatch pool configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Number of worker threads (at least one).
    pub workers: usize,
    /// Thread name prefix and logging name.
    pub name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            name: "monitor-dispatch".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The pool was shut down (or every worker exited); the notification was dropped.
    #[error("dispatch pool is closed")]
    Closed,
}

/// Dispatch runtime statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchStats {
    /// Notifications accepted by `submit`.
    pub submitted: u64,
    /// Individual monitor invocations that returned normally.
    pub delivered: u64,
    /// Individual monitor invocations that panicked.
    pub panicked: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    delivered: AtomicU64,
    panicked: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}

struct Notification<M> {
    message: M,
    monitors: Arc<[Monitor<M>]>,
}

/// Bounded worker pool delivering messages to monitors.
pub struct DispatchPool<M> {
    name: String,
    sender: Option<mpsc::Sender<Notification<M>>>,
    workers: Vec<thread::JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl<M> DispatchPool<M>
where
    M: Send + 'static,
{
    /// Spawn `config.workers` threads sharing one notification queue.
    pub fn spawn(config: DispatchConfig) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Notification<M>>();
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());
        let worker_count = config.workers.max(1);

        let mut workers = Vec::with_capacity(worker_count);
        for idx in 0..worker_count {
            let rx = rx.clone();
            let counters = counters.clone();
            let name = config.name.clone();
            let join = thread::Builder::new()
                .name(format!("{}-{idx}", config.name))
                .spawn(move || worker_loop(&name, idx, &rx, &counters))?;
            workers.push(join);
        }

        info!(pool = %config.name, workers = worker_count, "monitor dispatch pool started");

        Ok(Self {
            name: config.name,
            sender: Some(tx),
            workers,
            counters,
        })
    }

    /// Enqueue `message` for delivery to `monitors`. Never waits for delivery.
    pub fn submit(&self, message: M, monitors: Arc<[Monitor<M>]>) -> Result<(), DispatchError> {
        if monitors.is_empty() {
            return Ok(());
        }

        let sender = self.sender.as_ref().ok_or(DispatchError::Closed)?;
        sender
            .send(Notification { message, monitors })
            .map_err(|_| DispatchError::Closed)?;

        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl<M> DispatchPool<M> {
    /// Current counters (monotonic; read without synchronising with workers).
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    /// Stop accepting notifications, drain the queue and join all workers.
    pub fn shutdown(mut self) {
        self.sender.take();
        for join in self.workers.drain(..) {
            if join.join().is_err() {
                error!(pool = %self.name, "monitor dispatch worker panicked outside a monitor");
            }
        }
        info!(pool = %self.name, "monitor dispatch pool stopped");
    }
}

impl<M> Drop for DispatchPool<M> {
    fn drop(&mut self) {
        // Closing the channel lets detached workers drain what is queued and exit.
        self.sender.take();
    }
}

impl<M> core::fmt::Debug for DispatchPool<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("name", &self.name)
            .field("workers", &self.workers.len())
            .field("open", &self.sender.is_some())
            .finish()
    }
}

fn worker_loop<M>(
    name: &str,
    idx: usize,
    rx: &Mutex<mpsc::Receiver<Notification<M>>>,
    counters: &Counters,
) {
    loop {
        // Hold the receiver lock only while waiting, never while running monitors.
        let next = match rx.lock() {
            Ok(guard) => guard.recv(),
            Err(_) => {
                error!(pool = name, worker = idx, "notification queue lock poisoned");
                break;
            }
        };

        let Ok(notification) = next else {
            break;
        };

        deliver(name, &notification, counters);
    }

    debug!(pool = name, worker = idx, "monitor dispatch worker exiting");
}

fn deliver<M>(name: &str, notification: &Notification<M>, counters: &Counters) {
    for (position, monitor) in notification.monitors.iter().enumerate() {
        let outcome = catch_unwind(AssertUnwindSafe(|| monitor(&notification.message)));
        match outcome {
            Ok(()) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                counters.panicked.fetch_add(1, Ordering::Relaxed);
                warn!(
                    pool = name,
                    monitor = position,
                    panic = panic_message(payload.as_ref()),
                    "monitor panicked; continuing with remaining monitors"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::monitor::MonitorRegistry;

    fn pool(workers: usize) -> DispatchPool<u32> {
        DispatchPool::spawn(DispatchConfig::default().with_name("test-dispatch").with_workers(workers))
            .unwrap()
    }

    #[test]
    fn delivers_every_submission_once() {
        let pool = pool(3);
        let registry: MonitorRegistry<u32> = MonitorRegistry::new();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        registry.register(move |n: &u32| {
            let _ = tx.lock().unwrap().send(*n);
        });

        for n in 0..100 {
            pool.submit(n, registry.snapshot()).unwrap();
        }

        let mut seen: Vec<u32> = (0..100)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        pool.shutdown();
    }

    #[test]
    fn panicking_monitor_does_not_stop_the_rest() {
        let pool = pool(1);
        let registry: MonitorRegistry<u32> = MonitorRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        registry.register(|_: &u32| panic!("monitor failure"));
        let sink = seen.clone();
        registry.register(move |n: &u32| sink.lock().unwrap().push(*n));

        pool.submit(7, registry.snapshot()).unwrap();
        pool.submit(8, registry.snapshot()).unwrap();

        assert_eq!(pool.stats().submitted, 2);

        // Shutdown consumes the pool; keep the counters to read afterwards.
        let counters = pool.counters.clone();
        pool.shutdown();

        assert_eq!(*seen.lock().unwrap(), vec![7, 8]);
        let stats = counters.snapshot();
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.panicked, 2);
    }

    #[test]
    fn submit_without_monitors_is_a_no_op() {
        let pool = pool(1);
        let registry: MonitorRegistry<u32> = MonitorRegistry::new();
        pool.submit(1, registry.snapshot()).unwrap();
        assert_eq!(pool.stats().submitted, 0);
        pool.shutdown();
    }

    #[test]
    fn shutdown_drains_queued_notifications() {
        let pool = pool(1);
        let registry: MonitorRegistry<u32> = MonitorRegistry::new();
        let seen = Arc::new(Mutex::new(0u32));
        let sink = seen.clone();
        registry.register(move |_: &u32| {
            thread::sleep(Duration::from_millis(1));
            *sink.lock().unwrap() += 1;
        });

        for n in 0..20 {
            pool.submit(n, registry.snapshot()).unwrap();
        }
        pool.shutdown();

        assert_eq!(*seen.lock().unwrap(), 20);
    }

    #[test]
    fn zero_workers_is_clamped_to_one() {
        let config = DispatchConfig::default().with_workers(0);
        assert_eq!(config.workers, 1);
    }
}
