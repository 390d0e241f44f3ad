#![allow(dead_code)]

use std::sync::Arc;

use tally_core::{AccountId, UserId};
use tally_ledger::{
    Account, InMemoryDirectory, InMemoryLedgerStore, LedgerConfig, TransactionService, User,
};

pub type Service = TransactionService<Arc<InMemoryLedgerStore>, Arc<InMemoryDirectory>>;

pub struct Bank {
    pub service: Service,
    pub directory: Arc<InMemoryDirectory>,
    pub store: Arc<InMemoryLedgerStore>,
}

impl Bank {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        tally_observability::init_for_tests();

        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryLedgerStore::new());
        let service = TransactionService::new(store.clone(), directory.clone(), config)
            .expect("service starts");

        Self {
            service,
            directory,
            store,
        }
    }

    pub fn user(&self) -> UserId {
        let id = UserId::new();
        self.directory.insert_user(User::new(id));
        id
    }

    pub fn account(&self, owner: UserId, members: &[UserId]) -> AccountId {
        let id = AccountId::new();
        let account = members
            .iter()
            .fold(Account::new(id, owner), |acc, m| acc.with_member(*m));
        self.directory.insert_account(account);
        id
    }
}
