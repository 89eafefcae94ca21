//! Account existence lookups.

use dotname_types::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Minimal view of an account known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub account_number: u64,
}

/// Host-provided account lookup.
pub trait AccountKeeper {
    fn get_account(&self, address: &Address) -> Option<Account>;
}

impl<A: AccountKeeper + ?Sized> AccountKeeper for Arc<A> {
    fn get_account(&self, address: &Address) -> Option<Account> {
        (**self).get_account(address)
    }
}

#[derive(Debug, Default)]
struct AccountSet {
    accounts: HashMap<Address, Account>,
    next_account_number: u64,
}

/// In-memory account set.
///
/// Account numbers are never reused, even after an account is removed.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccounts {
    inner: Arc<RwLock<AccountSet>>,
}

impl MemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account for `address`, or return the existing one.
    pub fn create(&self, address: Address) -> Account {
        let mut set = self.inner.write();
        if let Some(existing) = set.accounts.get(&address) {
            return existing.clone();
        }
        let account = Account {
            address: address.clone(),
            account_number: set.next_account_number,
        };
        set.next_account_number += 1;
        set.accounts.insert(address, account.clone());
        account
    }

    pub fn remove(&self, address: &Address) -> Option<Account> {
        self.inner.write().accounts.remove(address)
    }
}

impl AccountKeeper for MemoryAccounts {
    fn get_account(&self, address: &Address) -> Option<Account> {
        self.inner.read().accounts.get(address).cloned()
    }
}
