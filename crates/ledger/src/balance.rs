//! Point-in-time balance aggregation ("sum as of").
//!
//! Recomputed from the store on every call: O(n) in the account's transaction
//! count, no caching.

use rust_decimal::Decimal;
use thiserror::Error;

use tally_core::{AccountId, Timestamp};

use crate::store::{LedgerStore, StoreError};
use crate::transaction::Transaction;

/// Balance computation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The running sum left the representable decimal range.
    #[error("balance of account {0} overflows")]
    Overflow(AccountId),
}

/// Sum of `amount` over transactions created strictly before `instant`.
///
/// `None` if the sum overflows.
pub fn sum_amounts_before<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    instant: Timestamp,
) -> Option<Decimal> {
    transactions
        .into_iter()
        .filter(|t| t.created() < instant)
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount()))
}

/// Balance of `account` from all transactions created strictly before `instant`.
///
/// Returns zero for an account with no transactions.
pub fn sum_before<S>(store: &S, account: AccountId, instant: Timestamp) -> Result<Decimal, BalanceError>
where
    S: LedgerStore + ?Sized,
{
    let snapshot = store.all_for_account(account)?;
    sum_amounts_before(&snapshot, instant).ok_or(BalanceError::Overflow(account))
}
