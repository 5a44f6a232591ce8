//! # Accounts
//!
//! Registered users of the ledger. An [`Account`] holds a username, an
//! Argon2id credential hash, and a balance. Accounts are provisioned
//! out-of-band (see [`AccountStore::create`]) and never created by ledger
//! traffic.
//!
//! Balance is maintained independently of transactions: recording or
//! settling a transaction leaves it untouched. Only
//! [`AccountStore::set_balance`] changes it.

pub mod credential;
pub mod store;

pub use credential::{hash_credential, verify_credential, CredentialError};
pub use store::AccountStore;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier.
pub type AccountId = u64;

/// A registered user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique, immutable identifier.
    pub id: AccountId,

    /// Unique login name.
    pub username: String,

    /// PHC-format Argon2id hash. Never logged, never returned to clients.
    pub(crate) credential_hash: String,

    /// Current balance.
    pub balance: f64,
}

impl Account {
    pub fn new(
        id: AccountId,
        username: impl Into<String>,
        credential_hash: String,
        balance: f64,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            credential_hash,
            balance,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("credential_hash", &"<redacted>")
            .field("balance", &self.balance)
            .finish()
    }
}
