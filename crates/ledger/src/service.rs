//! Transaction service (ledger orchestration).
//!
//! ## Create Flow
//!
//! ```text
//! create_transaction(created, user, account, amount)
//!   ↓
//! 1. Resolve account (directory)          → AccountNotFound
//!   ↓
//! 2. Parse timestamp                      → MalformedTimestamp
//!   ↓
//! 3. Owner-or-member check                → NotAuthorized
//!   ↓
//! 4. [account lock] sum before `created`, require sum + amount >= 0
//!                                         → InsufficientFunds / AmountOverflow
//!   ↓
//! 5. [account lock] append new transaction
//!   ↓
//! 6. Hand off to monitor dispatch (fire-and-forget)
//! ```
//!
//! Steps 4 and 5 run under the account's mutex so two concurrent creates on
//! the same account cannot both pass the funds check against the same balance.
//!
//! The funds check uses the balance as of the new transaction's own
//! timestamp, not the wall clock. A backdated transaction is judged against
//! only the transactions dated before it, even if later-dated ones already
//! exist.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use tally_core::{AccountId, Timestamp, TransactionId, UserId, parse_timestamp};
use tally_events::{DispatchPool, DispatchStats, MonitorRegistry};

use crate::authorize::is_owner_or_member;
use crate::balance::sum_before;
use crate::config::LedgerConfig;
use crate::directory::{Account, AccountDirectory};
use crate::error::{Activity, LedgerError};
use crate::locks::AccountLocks;
use crate::store::LedgerStore;
use crate::transaction::Transaction;

/// Ledger entry point: create transactions, aggregate balances, notify monitors.
///
/// `S` is the transaction store, `D` the external user/account directory.
/// The service is `Sync`; share it behind an `Arc` across threads.
pub struct TransactionService<S, D> {
    store: S,
    directory: D,
    locks: AccountLocks,
    monitors: MonitorRegistry<Transaction>,
    dispatch: DispatchPool<Transaction>,
}

impl<S, D> TransactionService<S, D>
where
    S: LedgerStore,
    D: AccountDirectory,
{
    /// Build the service and start its monitor dispatch pool.
    pub fn new(store: S, directory: D, config: LedgerConfig) -> Result<Self, LedgerError> {
        let dispatch = DispatchPool::spawn(config.dispatch).map_err(|e| {
            LedgerError::internal(
                Activity::CreateTransaction,
                format!("failed to start monitor dispatch: {e}"),
            )
        })?;

        Ok(Self {
            store,
            directory,
            locks: AccountLocks::new(),
            monitors: MonitorRegistry::new(),
            dispatch,
        })
    }

    /// Create and commit a transaction of `amount` on `account_id`.
    ///
    /// `created` must be `YYYY-MM-DD HH:MM`. The returned transaction is
    /// already in the store; monitors are notified afterwards, possibly after
    /// this call has returned.
    pub fn create_transaction(
        &self,
        created: &str,
        user_id: UserId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let activity = Activity::CreateTransaction;
        let (account, created) = self.resolve(activity, created, user_id, account_id)?;

        let transaction = {
            let lock = self
                .locks
                .handle(account_id)
                .map_err(|p| LedgerError::from_lock(activity, account_id, p))?;
            let _guard = lock
                .acquire()
                .map_err(|p| LedgerError::from_lock(activity, account_id, p))?;

            let balance = sum_before(&self.store, account.id_typed(), created)
                .map_err(|e| LedgerError::from_balance(activity, e))?;

            let prospective = balance.checked_add(amount).ok_or(LedgerError::AmountOverflow {
                activity,
                account_id,
            })?;

            if prospective < Decimal::ZERO {
                warn!(
                    account_id = %account_id,
                    user_id = %user_id,
                    balance = %balance,
                    amount = %amount,
                    "transaction rejected: insufficient funds"
                );
                return Err(LedgerError::InsufficientFunds {
                    account_id,
                    balance,
                    amount,
                });
            }

            let user = self.directory.user(user_id).ok_or_else(|| {
                LedgerError::internal(activity, format!("authorized user {user_id} missing from directory"))
            })?;

            let transaction = Transaction::new(
                TransactionId::new(),
                created,
                user.id_typed(),
                account.id_typed(),
                amount,
            );

            self.store
                .append(transaction)
                .map_err(|e| LedgerError::from_store(activity, e))?
        };

        debug!(
            transaction_id = %transaction.id_typed(),
            account_id = %account_id,
            user_id = %user_id,
            created = %transaction.created(),
            amount = %amount,
            "transaction committed"
        );

        if let Err(err) = self
            .dispatch
            .submit(transaction.clone(), self.monitors.snapshot())
        {
            warn!(
                transaction_id = %transaction.id_typed(),
                error = %err,
                "monitor notification dropped"
            );
        }

        Ok(transaction)
    }

    /// Balance of `account_id` from transactions created strictly before `created`.
    ///
    /// Read-only; does not take the account's write-side lock.
    pub fn sum_as_of(
        &self,
        created: &str,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<Decimal, LedgerError> {
        let activity = Activity::SumTransaction;
        let (account, instant) = self.resolve(activity, created, user_id, account_id)?;

        sum_before(&self.store, account.id_typed(), instant)
            .map_err(|e| LedgerError::from_balance(activity, e))
    }

    /// Register a monitor invoked once for every transaction committed after
    /// this call. Registering the same callback twice invokes it twice.
    pub fn register_monitor<F>(&self, monitor: F)
    where
        F: Fn(&Transaction) + Send + Sync + 'static,
    {
        self.monitors.register(monitor);
    }

    /// Look up a committed transaction by id.
    pub fn lookup_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        self.store
            .lookup_by_id(id)
            .map_err(|e| LedgerError::from_store(Activity::SumTransaction, e))
    }

    /// Account, timestamp and authorization checks shared by both operations,
    /// in that order.
    fn resolve(
        &self,
        activity: Activity,
        created: &str,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<(Account, Timestamp), LedgerError> {
        let account = self
            .directory
            .account(account_id)
            .ok_or(LedgerError::AccountNotFound {
                activity,
                account_id,
            })?;

        let instant = parse_timestamp(created)
            .map_err(|source| LedgerError::MalformedTimestamp { activity, source })?;

        if !is_owner_or_member(user_id, &account) {
            warn!(
                activity = %activity,
                user_id = %user_id,
                account_id = %account_id,
                "operation rejected: not owner or member"
            );
            return Err(LedgerError::NotAuthorized {
                activity,
                user_id,
                account_id,
            });
        }

        Ok((account, instant))
    }
}

impl<S, D> TransactionService<S, D> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatch.stats()
    }

    /// Stop monitor dispatch after delivering everything already queued.
    ///
    /// Dropping the service instead leaves the workers to drain in the background.
    pub fn shutdown(self) {
        self.dispatch.shutdown();
    }
}

impl<S, D> core::fmt::Debug for TransactionService<S, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransactionService")
            .field("monitors", &self.monitors)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}
