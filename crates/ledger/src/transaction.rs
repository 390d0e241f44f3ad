use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::{AccountId, Entity, Timestamp, TransactionId, UserId};

/// A committed monetary movement on one account (immutable).
///
/// Only the transaction service constructs these; once appended to the store
/// they are treated as facts. Monitors receive them by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    created: Timestamp,
    user: UserId,
    account: AccountId,
    /// Signed: deposits positive, withdrawals negative.
    amount: Decimal,
}

impl Transaction {
    pub(crate) fn new(
        id: TransactionId,
        created: Timestamp,
        user: UserId,
        account: AccountId,
        amount: Decimal,
    ) -> Self {
        Self {
            id,
            created,
            user,
            account,
            amount,
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
