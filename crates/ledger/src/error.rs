//! Ledger operation errors.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use tally_core::{AccountId, DomainError, UserId};

use crate::balance::BalanceError;
use crate::locks::LockPoisoned;
use crate::store::StoreError;

/// The service operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    CreateTransaction,
    SumTransaction,
}

impl core::fmt::Display for Activity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Activity::CreateTransaction => f.write_str("create transaction"),
            Activity::SumTransaction => f.write_str("sum transactions"),
        }
    }
}

/// Error returned synchronously by the transaction service.
///
/// ## Error Categories
///
/// - **AccountNotFound / MalformedTimestamp / InsufficientFunds**: caller can
///   fix the input (or fund the account) and retry
/// - **NotAuthorized**: the caller is neither owner nor member; not retried
/// - **AmountOverflow**: the balance left the decimal range; nothing was
///   appended and the account stays usable
/// - **Internal**: lock poisoning or a directory inconsistency; the call was
///   aborted before anything was appended
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{activity}: account {account_id} not found")]
    AccountNotFound {
        activity: Activity,
        account_id: AccountId,
    },

    #[error("{activity}: {source}")]
    MalformedTimestamp {
        activity: Activity,
        #[source]
        source: DomainError,
    },

    #[error("{activity}: user {user_id} is neither owner nor member of account {account_id}")]
    NotAuthorized {
        activity: Activity,
        user_id: UserId,
        account_id: AccountId,
    },

    #[error("insufficient funds on account {account_id}: balance {balance}, amount {amount}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Decimal,
        amount: Decimal,
    },

    #[error("{activity}: balance of account {account_id} out of range")]
    AmountOverflow {
        activity: Activity,
        account_id: AccountId,
    },

    #[error("{activity}: internal error: {message}")]
    Internal { activity: Activity, message: String },
}

impl LedgerError {
    pub fn internal(activity: Activity, message: impl Into<String>) -> Self {
        Self::Internal {
            activity,
            message: message.into(),
        }
    }

    pub(crate) fn from_store(activity: Activity, err: StoreError) -> Self {
        Self::internal(activity, err.to_string())
    }

    pub(crate) fn from_balance(activity: Activity, err: BalanceError) -> Self {
        match err {
            BalanceError::Store(e) => Self::from_store(activity, e),
            BalanceError::Overflow(account_id) => Self::AmountOverflow {
                activity,
                account_id,
            },
        }
    }

    pub(crate) fn from_lock(activity: Activity, account_id: AccountId, _: LockPoisoned) -> Self {
        Self::internal(activity, format!("lock for account {account_id} poisoned"))
    }

    pub fn activity(&self) -> Activity {
        match self {
            LedgerError::AccountNotFound { activity, .. }
            | LedgerError::MalformedTimestamp { activity, .. }
            | LedgerError::NotAuthorized { activity, .. }
            | LedgerError::AmountOverflow { activity, .. }
            | LedgerError::Internal { activity, .. } => *activity,
            LedgerError::InsufficientFunds { .. } => Activity::CreateTransaction,
        }
    }

    /// Whether the caller can reasonably retry after changing input or state.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::AccountNotFound { .. }
                | LedgerError::MalformedTimestamp { .. }
                | LedgerError::InsufficientFunds { .. }
        )
    }
}
