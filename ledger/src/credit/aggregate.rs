//! Volume aggregation over a user's transaction history.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::AccountId;
use crate::config::PERCENT_PRECISION;
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::{LedgerStore, Transaction, TransactionType};

/// How a user's transaction volume splits between borrowing and lending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBreakdown {
    /// Signed sum of all Borrow amounts.
    pub borrow_sum: f64,
    /// Signed sum of all Lend amounts.
    pub lend_sum: f64,
    /// `|borrow_sum| + |lend_sum|`. Always positive.
    pub total_volume: f64,
    /// Share of volume from borrowing, 0.0–100.0, one decimal.
    pub pct_borrowed: f64,
    /// Share of volume from lending, 0.0–100.0, one decimal.
    pub pct_lent: f64,
}

/// Round `value` to `precision` decimal places.
///
/// Rounds the exact binary value of `value`, not a scaled copy of it, so
/// `89.85` (stored as 89.8499...) becomes `89.8`.
pub fn round_to(value: f64, precision: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.precision$}").parse().unwrap_or(value)
}

/// Compute the breakdown for a set of transactions.
///
/// Returns `None` when the total volume is zero (no records, or every
/// amount is zero).
pub fn breakdown(transactions: &[Transaction]) -> Option<VolumeBreakdown> {
    let (borrow_sum, lend_sum) =
        transactions
            .iter()
            .fold((0.0_f64, 0.0_f64), |(borrow, lend), tx| match tx.kind {
                TransactionType::Borrow => (borrow + tx.amount, lend),
                TransactionType::Lend => (borrow, lend + tx.amount),
            });

    let total_volume = borrow_sum.abs() + lend_sum.abs();
    if total_volume == 0.0 || !total_volume.is_finite() {
        return None;
    }

    Some(VolumeBreakdown {
        borrow_sum,
        lend_sum,
        total_volume,
        pct_borrowed: round_to(borrow_sum.abs() / total_volume * 100.0, PERCENT_PRECISION),
        pct_lent: round_to(lend_sum.abs() / total_volume * 100.0, PERCENT_PRECISION),
    })
}

/// Reads a user's history from the ledger and aggregates it.
#[derive(Debug, Clone)]
pub struct Aggregator {
    ledger: LedgerStore,
}

impl Aggregator {
    pub fn new(ledger: LedgerStore) -> Self {
        Self { ledger }
    }

    /// Fails with [`LedgerError::InsufficientData`] if the user has no
    /// transactions or their volume sums to zero.
    pub fn aggregate(&self, user_id: AccountId) -> LedgerResult<VolumeBreakdown> {
        let transactions = match self.ledger.list_by_user(user_id) {
            Ok(records) => records,
            Err(LedgerError::EmptyResult(_)) => Vec::new(),
            Err(other) => return Err(other),
        };

        let result = breakdown(&transactions).ok_or_else(|| {
            LedgerError::InsufficientData(format!("user {user_id} has no transaction volume"))
        })?;

        debug!(
            user_id,
            records = transactions.len(),
            pct_borrowed = result.pct_borrowed,
            pct_lent = result.pct_lent,
            "volume aggregated"
        );
        Ok(result)
    }
}
