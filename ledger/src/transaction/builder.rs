//! Transaction records and their construction.
//!
//! Callers never build a [`Transaction`] directly. They fill in a
//! [`TransactionDraft`] with the fields they own, and the ledger store turns
//! it into a record by stamping a fresh random id and the current time. The
//! draft keeps every field optional so that "missing" is representable and
//! can be reported as a validation error instead of a deserialization panic
//! somewhere upstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{TransactionStatus, TransactionType};
use crate::account::AccountId;
use crate::config::MAX_REASON_LENGTH;
use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A persisted ledger entry.
///
/// `id` and `timestamp` are assigned by the ledger at insertion and never
/// change afterwards. `status` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Random v4 identifier, unique across the ledger.
    pub id: Uuid,

    /// Account that owns this entry.
    pub user_id: AccountId,

    /// Borrow or lend, from `user_id`'s point of view.
    pub kind: TransactionType,

    /// Amount as supplied by the caller. Positive by convention.
    pub amount: f64,

    /// Settlement state.
    pub status: TransactionStatus,

    /// When the ledger accepted the entry (UTC).
    pub timestamp: DateTime<Utc>,

    /// The other party, if recorded.
    pub counterparty: Option<AccountId>,

    /// Free-text note.
    pub reason: Option<String>,
}

impl Transaction {
    /// Stamps a validated draft with a fresh id and the current time.
    pub(crate) fn from_draft(draft: ValidatedDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            kind: draft.kind,
            amount: draft.amount,
            status: draft.status,
            timestamp: Utc::now(),
            counterparty: draft.counterparty,
            reason: draft.reason,
        }
    }

    /// Amount as a non-negative magnitude, whatever sign the caller used.
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    /// Returns `true` if this entry is a borrowing.
    pub fn is_borrow(&self) -> bool {
        self.kind == TransactionType::Borrow
    }

    /// Returns `true` if this entry is a loan to someone else.
    pub fn is_lend(&self) -> bool {
        self.kind == TransactionType::Lend
    }
}

// ---------------------------------------------------------------------------
// TransactionDraft
// ---------------------------------------------------------------------------

/// Caller-supplied fields of a transaction that has not been persisted yet.
///
/// # Usage
///
/// ```
/// use peerledger::transaction::{TransactionDraft, TransactionStatus, TransactionType};
///
/// let draft = TransactionDraft::new()
///     .user_id(1)
///     .kind(TransactionType::Borrow)
///     .amount(250.0)
///     .status(TransactionStatus::Unpaid)
///     .counterparty(2)
///     .reason("rent");
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub user_id: Option<AccountId>,
    pub kind: Option<TransactionType>,
    pub amount: Option<f64>,
    pub status: Option<TransactionStatus>,
    pub counterparty: Option<AccountId>,
    pub reason: Option<String>,
}

impl TransactionDraft {
    /// Starts an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: AccountId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn counterparty(mut self, counterparty: AccountId) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Checks that every required field is present and well-formed.
    ///
    /// Required: `user_id`, `kind`, `amount`, `status`. The amount must be a
    /// finite number; its sign is not checked.
    pub fn validate(self) -> LedgerResult<ValidatedDraft> {
        let user_id = self.user_id.ok_or_else(|| missing("user_id"))?;
        let kind = self.kind.ok_or_else(|| missing("transaction_type"))?;
        let amount = self.amount.ok_or_else(|| missing("transaction_amount"))?;
        let status = self.status.ok_or_else(|| missing("transaction_status"))?;

        if !amount.is_finite() {
            return Err(LedgerError::Validation(
                "transaction_amount must be a finite number".to_string(),
            ));
        }

        if let Some(ref reason) = self.reason {
            if reason.len() > MAX_REASON_LENGTH {
                return Err(LedgerError::Validation(format!(
                    "reason exceeds {MAX_REASON_LENGTH} bytes"
                )));
            }
        }

        Ok(ValidatedDraft {
            user_id,
            kind,
            amount,
            status,
            counterparty: self.counterparty,
            reason: self.reason,
        })
    }
}

fn missing(field: &str) -> LedgerError {
    LedgerError::Validation(format!("missing required field: {field}"))
}

/// A draft whose required fields have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub(crate) user_id: AccountId,
    pub(crate) kind: TransactionType,
    pub(crate) amount: f64,
    pub(crate) status: TransactionStatus,
    pub(crate) counterparty: Option<AccountId>,
    pub(crate) reason: Option<String>,
}
