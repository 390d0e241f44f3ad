use std::collections::HashMap;
use std::sync::RwLock;

use tally_core::{AccountId, Entity, TransactionId};

use super::{LedgerStore, StoreError};
use crate::transaction::Transaction;

#[derive(Debug, Default)]
struct Inner {
    by_account: HashMap<AccountId, Vec<Transaction>>,
    by_id: HashMap<TransactionId, AccountId>,
}

/// In-memory append-only transaction store.
///
/// One `RwLock` guards both indexes so an append is never half-visible.
/// Reads clone out under the read lock (copy-on-read).
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<Inner>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions across all accounts.
    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned("len"))?;
        Ok(inner.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Poisoned("append"))?;

        inner
            .by_id
            .insert(*transaction.id(), transaction.account());
        inner
            .by_account
            .entry(transaction.account())
            .or_default()
            .push(transaction.clone());

        Ok(transaction)
    }

    fn all_for_account(&self, account: AccountId) -> Result<Vec<Transaction>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Poisoned("all_for_account"))?;

        Ok(inner.by_account.get(&account).cloned().unwrap_or_default())
    }

    fn lookup_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Poisoned("lookup_by_id"))?;

        let found = inner
            .by_id
            .get(&id)
            .and_then(|account| inner.by_account.get(account))
            .and_then(|txs| txs.iter().find(|t| t.id_typed() == id))
            .cloned();

        Ok(found)
    }

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Poisoned("delete"))?;

        let Some(account) = inner.by_id.remove(&id) else {
            return Ok(None);
        };

        let removed = inner.by_account.get_mut(&account).and_then(|txs| {
            let pos = txs.iter().position(|t| t.id_typed() == id)?;
            Some(txs.remove(pos))
        });

        Ok(removed)
    }
}
