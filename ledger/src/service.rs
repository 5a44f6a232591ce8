//! # Ledger Service
//!
//! The boundary the transport shell talks to. [`LedgerService`] bundles the
//! stores over one explicit [`LedgerDb`] context and exposes the five
//! operations clients can invoke:
//!
//! | Operation                 | Output          | Error signal       |
//! |---------------------------|-----------------|--------------------|
//! | `authenticate`            | account id      | `Unauthorized`     |
//! | `create_transaction`      | `Transaction`   | `Validation`       |
//! | `mark_paid`               | `Transaction`   | `NotFound`         |
//! | `list_transactions`       | `Vec<Transaction>` | `EmptyResult`   |
//! | `compute_credit_score`    | `u32`           | `InsufficientData` |
//!
//! Any of them may also fail with `Storage`. The service never retries.

use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::account::{credential, AccountId, AccountStore};
use crate::config::LedgerConfig;
use crate::credit::{Aggregator, CreditScore, Scorer, VolumeBreakdown};
use crate::error::{LedgerError, LedgerResult};
use crate::storage::LedgerDb;
use crate::transaction::{LedgerStore, Transaction, TransactionDraft, TransactionManager};

/// Façade over accounts, ledger and scoring.
#[derive(Debug, Clone)]
pub struct LedgerService {
    accounts: AccountStore,
    transactions: TransactionManager,
    aggregator: Aggregator,
    scorer: Scorer,
}

impl LedgerService {
    pub fn new(db: LedgerDb, config: &LedgerConfig) -> Self {
        let db = db.with_flush_on_write(config.flush_on_write);
        let ledger = LedgerStore::new(db.clone());
        Self {
            accounts: AccountStore::new(db, config),
            transactions: TransactionManager::new(ledger.clone()),
            aggregator: Aggregator::new(ledger),
            scorer: Scorer::new(),
        }
    }

    /// Open (or create) the database at `path` and build a service over it.
    pub fn open<P: AsRef<Path>>(path: P, config: &LedgerConfig) -> LedgerResult<Self> {
        let db = LedgerDb::open(path)?;
        Ok(Self::new(db, config))
    }

    /// Account provisioning and balance management.
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Resolve a username and credential to an account id.
    ///
    /// An unknown username and a wrong credential both yield
    /// [`LedgerError::Unauthorized`], and both pay for one hash verification.
    pub fn authenticate(&self, username: &str, plaintext: &str) -> LedgerResult<AccountId> {
        let account = match self.accounts.find_by_username(username) {
            Ok(account) => account,
            Err(LedgerError::NotFound(_)) => {
                credential::burn_verification(plaintext);
                warn!("authentication failed");
                return Err(LedgerError::Unauthorized);
            }
            Err(other) => return Err(other),
        };

        if !self.accounts.verify_credential(&account, plaintext) {
            warn!("authentication failed");
            return Err(LedgerError::Unauthorized);
        }

        info!(account_id = account.id, "authenticated");
        Ok(account.id)
    }

    pub fn create_transaction(&self, draft: TransactionDraft) -> LedgerResult<Transaction> {
        self.transactions.create_from_draft(draft)
    }

    pub fn mark_paid(&self, id: &Uuid) -> LedgerResult<Transaction> {
        self.transactions.mark_paid(id)
    }

    pub fn get_transaction(&self, id: &Uuid) -> LedgerResult<Transaction> {
        self.transactions.ledger().get(id)
    }

    pub fn list_transactions(&self, user_id: AccountId) -> LedgerResult<Vec<Transaction>> {
        self.transactions.ledger().list_by_user(user_id)
    }

    /// The integer credit score for `user_id`.
    pub fn compute_credit_score(&self, user_id: AccountId) -> LedgerResult<u32> {
        self.credit_report(user_id).map(|(_, score)| score.total)
    }

    /// Volume breakdown and both score halves.
    pub fn credit_report(&self, user_id: AccountId) -> LedgerResult<(VolumeBreakdown, CreditScore)> {
        let volume = self.aggregator.aggregate(user_id)?;
        let score = self.scorer.score(&volume);
        info!(user_id, score = score.total, "credit score computed");
        Ok((volume, score))
    }
}
