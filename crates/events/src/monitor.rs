//! Monitor registry (observer callbacks, insertion-ordered).

use std::sync::{Arc, RwLock};

/// An observer callback notified after a message is committed.
pub type Monitor<M> = Arc<dyn Fn(&M) + Send + Sync>;

/// Ordered set of monitors.
///
/// - Insertion order is preserved and is the invocation order per message
/// - No deduplication: registering the same callback twice runs it twice
/// - Monitors are never removed
pub struct MonitorRegistry<M> {
    monitors: RwLock<Vec<Monitor<M>>>,
}

impl<M> MonitorRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a monitor.
    pub fn register<F>(&self, monitor: F)
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(monitor));
    }

    /// Append an already shared monitor (the same `Arc` may be registered repeatedly).
    pub fn register_shared(&self, monitor: Monitor<M>) {
        // Registration only pushes; a poisoned lock still holds a consistent Vec.
        let mut monitors = self.monitors.write().unwrap_or_else(|p| p.into_inner());
        monitors.push(monitor);
    }

    /// Point-in-time copy of the registered monitors, in insertion order.
    pub fn snapshot(&self) -> Arc<[Monitor<M>]> {
        let monitors = self.monitors.read().unwrap_or_else(|p| p.into_inner());
        monitors.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.monitors.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M> Default for MonitorRegistry<M> {
    fn default() -> Self {
        Self {
            monitors: RwLock::new(Vec::new()),
        }
    }
}

impl<M> core::fmt::Debug for MonitorRegistry<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("monitors", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn snapshot_preserves_insertion_order() {
        let registry: MonitorRegistry<u32> = MonitorRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let seen = seen.clone();
            registry.register(move |n: &u32| seen.lock().unwrap().push(format!("{tag}{n}")));
        }

        for m in registry.snapshot().iter() {
            m(&1);
        }

        assert_eq!(*seen.lock().unwrap(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn same_monitor_registered_twice_runs_twice() {
        let registry: MonitorRegistry<()> = MonitorRegistry::new();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let monitor: Monitor<()> = Arc::new(move |_: &()| *counter.lock().unwrap() += 1);

        registry.register_shared(monitor.clone());
        registry.register_shared(monitor);

        for m in registry.snapshot().iter() {
            m(&());
        }
        assert_eq!(*count.lock().unwrap(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_registration() {
        let registry: MonitorRegistry<()> = MonitorRegistry::new();
        registry.register(|_| {});
        let before = registry.snapshot();
        registry.register(|_| {});

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }
}
