//! Append-only transaction store boundary.
//!
//! This module defines the storage abstraction the ledger service writes to
//! and aggregates over, without making any persistence assumptions.

pub mod in_memory;

pub use in_memory::InMemoryLedgerStore;

use std::sync::Arc;

use thiserror::Error;

use tally_core::{AccountId, TransactionId};

use crate::transaction::Transaction;

/// Store operation error.
///
/// These are **infrastructure errors**; validation of transaction content is
/// the service's job and never surfaces here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned during {0}")]
    Poisoned(&'static str),
}

/// Append-only, thread-safe transaction store.
///
/// ## Read Semantics
///
/// `all_for_account()` returns a point-in-time copy: appends that race with the
/// caller's iteration are not observed, and the returned sequence can be
/// walked any number of times. Transactions come back in append order.
///
/// ## Write Semantics
///
/// `append()` never rejects a transaction on content and must be safe under
/// any number of concurrent callers. `delete()` exists as a repository
/// primitive only; the ledger flow never removes transactions.
pub trait LedgerStore: Send + Sync {
    fn append(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    fn all_for_account(&self, account: AccountId) -> Result<Vec<Transaction>, StoreError>;

    fn lookup_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        (**self).append(transaction)
    }

    fn all_for_account(&self, account: AccountId) -> Result<Vec<Transaction>, StoreError> {
        (**self).all_for_account(account)
    }

    fn lookup_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).lookup_by_id(id)
    }

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).delete(id)
    }
}
