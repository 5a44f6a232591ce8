//! # Transaction Lifecycle
//!
//! [`TransactionManager`] is the only writer of ledger entries. It creates
//! records and settles them; nothing else mutates a stored transaction.
//!
//! ```text
//!    ┌──────────┐   mark_paid   ┌──────────┐
//!    │  Unpaid  │ ────────────► │   Paid   │ ◄─┐ mark_paid (no-op)
//!    └──────────┘               └──────────┘ ──┘
//! ```
//!
//! A record may also be created directly as `Paid`. Settlement is one-way
//! and idempotent.

use tracing::info;
use uuid::Uuid;

use super::builder::{Transaction, TransactionDraft};
use super::store::LedgerStore;
use super::types::{TransactionStatus, TransactionType};
use crate::account::AccountId;
use crate::error::LedgerResult;

/// Creates and settles ledger entries.
#[derive(Debug, Clone)]
pub struct TransactionManager {
    ledger: LedgerStore,
}

impl TransactionManager {
    pub fn new(ledger: LedgerStore) -> Self {
        Self { ledger }
    }

    /// Record a new entry and return it as stored.
    ///
    /// The amount's sign is not checked against `kind`; the ledger keeps
    /// whatever the caller sent.
    pub fn create(
        &self,
        user_id: AccountId,
        kind: TransactionType,
        amount: f64,
        status: TransactionStatus,
        counterparty: Option<AccountId>,
        reason: Option<String>,
    ) -> LedgerResult<Transaction> {
        self.create_from_draft(TransactionDraft {
            user_id: Some(user_id),
            kind: Some(kind),
            amount: Some(amount),
            status: Some(status),
            counterparty,
            reason,
        })
    }

    /// Record a possibly incomplete draft. Missing required fields fail
    /// with a validation error naming the field.
    pub fn create_from_draft(&self, draft: TransactionDraft) -> LedgerResult<Transaction> {
        self.ledger.insert_record(draft)
    }

    /// Settle a transaction.
    ///
    /// Calling this on an already settled record succeeds and leaves it
    /// unchanged.
    pub fn mark_paid(&self, id: &Uuid) -> LedgerResult<Transaction> {
        let tx = self.ledger.update_status(id, TransactionStatus::Paid)?;
        info!(tx_id = %id, user_id = tx.user_id, "transaction settled");
        Ok(tx)
    }

    /// The underlying ledger, for read paths.
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }
}
