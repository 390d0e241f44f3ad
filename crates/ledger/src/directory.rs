//! Port to the external user/account directory.
//!
//! Users and accounts are owned (created, renamed, deactivated) elsewhere. The
//! ledger only reads them through [`AccountDirectory`] and never mutates the
//! values it gets back.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use tally_core::{AccountId, Entity, UserId};

/// Read-only view of a directory user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    active: bool,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self { id, active: true }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Read-only view of a directory account.
///
/// `users` holds the non-owner members allowed to transact on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    owner: UserId,
    active: bool,
    users: Vec<UserId>,
}

impl Account {
    pub fn new(id: AccountId, owner: UserId) -> Self {
        Self {
            id,
            owner,
            active: true,
            users: Vec::new(),
        }
    }

    pub fn with_member(mut self, user: UserId) -> Self {
        if user != self.owner && !self.users.contains(&user) {
            self.users.push(user);
        }
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.iter().copied()
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Lookup contract the ledger consumes from the surrounding application.
pub trait AccountDirectory: Send + Sync {
    fn account(&self, id: AccountId) -> Option<Account>;

    fn user(&self, id: UserId) -> Option<User>;
}

impl<D> AccountDirectory for Arc<D>
where
    D: AccountDirectory + ?Sized,
{
    fn account(&self, id: AccountId) -> Option<Account> {
        (**self).account(id)
    }

    fn user(&self, id: UserId) -> Option<User> {
        (**self).user(id)
    }
}

/// In-memory directory for tests/dev and for embedding without a backing store.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<HashMap<AccountId, Account>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        let mut users = self.users.write().unwrap_or_else(|p| p.into_inner());
        users.insert(*user.id(), user);
    }

    pub fn insert_account(&self, account: Account) {
        let mut accounts = self.accounts.write().unwrap_or_else(|p| p.into_inner());
        accounts.insert(*account.id(), account);
    }

    /// Assign `user` to `account`. Returns false if the account is unknown.
    pub fn add_member(&self, account: AccountId, user: UserId) -> bool {
        let mut accounts = self.accounts.write().unwrap_or_else(|p| p.into_inner());
        match accounts.remove(&account) {
            Some(existing) => {
                accounts.insert(account, existing.with_member(user));
                true
            }
            None => false,
        }
    }

    /// Unassign `user` from `account`. Returns false if the account is unknown.
    pub fn remove_member(&self, account: AccountId, user: UserId) -> bool {
        let mut accounts = self.accounts.write().unwrap_or_else(|p| p.into_inner());
        match accounts.get_mut(&account) {
            Some(existing) => {
                existing.users.retain(|u| *u != user);
                true
            }
            None => false,
        }
    }
}

impl AccountDirectory for InMemoryDirectory {
    fn account(&self, id: AccountId) -> Option<Account> {
        let accounts = self.accounts.read().unwrap_or_else(|p| p.into_inner());
        accounts.get(&id).cloned()
    }

    fn user(&self, id: UserId) -> Option<User> {
        let users = self.users.read().unwrap_or_else(|p| p.into_inner());
        users.get(&id).cloned()
    }
}
