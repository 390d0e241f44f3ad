//! Per-account mutual exclusion for the funds check.
//!
//! Callers on the same account serialize on that account's mutex; different
//! accounts never contend beyond the brief table lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tally_core::AccountId;

/// A poisoned account or table lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPoisoned;

/// Table of lazily created per-account locks.
///
/// Entries are never evicted; the table grows with the number of distinct
/// accounts that have been written to.
#[derive(Debug, Default)]
pub struct AccountLocks {
    table: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for `account`, created on first use.
    pub fn handle(&self, account: AccountId) -> Result<AccountLock, LockPoisoned> {
        let mut table = self.table.lock().map_err(|_| LockPoisoned)?;
        let lock = table.entry(account).or_default().clone();
        Ok(AccountLock { lock })
    }

    /// Number of accounts that currently have a lock entry.
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to one account's mutex.
#[derive(Debug, Clone)]
pub struct AccountLock {
    lock: Arc<Mutex<()>>,
}

impl AccountLock {
    /// Block until this account's critical section is free.
    pub fn acquire(&self) -> Result<MutexGuard<'_, ()>, LockPoisoned> {
        self.lock.lock().map_err(|_| LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_account_shares_one_lock() {
        let locks = AccountLocks::new();
        let account = AccountId::new();
        let a = locks.handle(account).unwrap();
        let b = locks.handle(account).unwrap();
        assert!(Arc::ptr_eq(&a.lock, &b.lock));

        let other = locks.handle(AccountId::new()).unwrap();
        assert!(!Arc::ptr_eq(&a.lock, &other.lock));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn critical_sections_on_one_account_never_overlap() {
        let locks = Arc::new(AccountLocks::new());
        let account = AccountId::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                let max_seen = max_seen.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        let lock = locks.handle(account).unwrap();
                        let _guard = lock.acquire().unwrap();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_micros(50));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
