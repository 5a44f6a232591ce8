//! Account persistence and lookup.

use tracing::{debug, info};

use super::credential::{self, hash_credential};
use super::{Account, AccountId};
use crate::config::{LedgerConfig, MAX_USERNAME_LENGTH};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::{DbError, LedgerDb};

/// Owns every [`Account`] record.
#[derive(Debug, Clone)]
pub struct AccountStore {
    db: LedgerDb,
    min_password_length: usize,
}

impl AccountStore {
    pub fn new(db: LedgerDb, config: &LedgerConfig) -> Self {
        Self {
            db,
            min_password_length: config.min_password_length,
        }
    }

    /// Provision a new account.
    ///
    /// Fails with [`LedgerError::Validation`] on an empty or oversized
    /// username, a short password, a non-finite balance, or a username that
    /// is already taken.
    pub fn create(&self, username: &str, plaintext: &str, balance: f64) -> LedgerResult<Account> {
        if username.trim().is_empty() {
            return Err(LedgerError::Validation("username must not be empty".into()));
        }
        if username.len() > MAX_USERNAME_LENGTH {
            return Err(LedgerError::Validation(format!(
                "username exceeds {MAX_USERNAME_LENGTH} bytes"
            )));
        }
        if plaintext.chars().count() < self.min_password_length {
            return Err(LedgerError::Validation(format!(
                "password must be at least {} characters",
                self.min_password_length
            )));
        }
        if !balance.is_finite() {
            return Err(LedgerError::Validation("balance must be a finite number".into()));
        }

        let hash = hash_credential(plaintext)?;
        let account = Account::new(self.db.next_account_id()?, username, hash, balance);

        match self.db.create_account(&account) {
            Ok(()) => {}
            Err(DbError::DuplicateKey(_)) => {
                return Err(LedgerError::Validation(format!(
                    "username already taken: {username}"
                )));
            }
            Err(other) => return Err(other.into()),
        }

        info!(account_id = account.id, "account created");
        Ok(account)
    }

    /// Look up an account by its login name.
    pub fn find_by_username(&self, username: &str) -> LedgerResult<Account> {
        let id = self
            .db
            .get_account_id_by_username(username)?
            .ok_or_else(|| LedgerError::NotFound("account".into()))?;
        self.get(id)
    }

    /// Look up an account by id.
    pub fn get(&self, id: AccountId) -> LedgerResult<Account> {
        self.db
            .get_account(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("account {id}")))
    }

    /// Check `plaintext` against the account's stored hash.
    pub fn verify_credential(&self, account: &Account, plaintext: &str) -> bool {
        let ok = credential::verify_credential(plaintext, &account.credential_hash);
        debug!(account_id = account.id, ok, "credential checked");
        ok
    }

    /// Overwrite an account's balance.
    pub fn set_balance(&self, id: AccountId, balance: f64) -> LedgerResult<Account> {
        if !balance.is_finite() {
            return Err(LedgerError::Validation("balance must be a finite number".into()));
        }
        let account = self
            .db
            .update_account(id, |a| a.balance = balance)?
            .ok_or_else(|| LedgerError::NotFound(format!("account {id}")))?;
        info!(account_id = id, balance, "balance updated");
        Ok(account)
    }

    /// Number of provisioned accounts.
    pub fn account_count(&self) -> usize {
        self.db.account_count()
    }
}
