//! Owner-or-member check at the ledger boundary.
//!
//! - No IO
//! - No panics
//! - Only ids are compared; the user's `active` flag is not consulted

use tally_core::UserId;

use crate::directory::Account;

/// True iff `user` owns `account` or is one of its assigned members.
pub fn is_owner_or_member(user: UserId, account: &Account) -> bool {
    account.owner() == user || account.users().any(|member| member == user)
}
