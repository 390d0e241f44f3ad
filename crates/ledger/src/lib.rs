//! `tally-ledger` — transaction ledger core.
//!
//! Creates transactions against directory-owned accounts with a no-overdraft
//! check, answers point-in-time balance queries, and notifies monitors after
//! every commit.

pub mod authorize;
pub mod balance;
pub mod config;
pub mod directory;
pub mod error;
pub mod locks;
pub mod service;
pub mod store;
pub mod transaction;

pub use authorize::is_owner_or_member;
pub use balance::{BalanceError, sum_amounts_before, sum_before};
pub use config::LedgerConfig;
pub use directory::{Account, AccountDirectory, InMemoryDirectory, User};
pub use error::{Activity, LedgerError};
pub use service::TransactionService;
pub use store::{InMemoryLedgerStore, LedgerStore, StoreError};
pub use transaction::Transaction;
